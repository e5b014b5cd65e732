// src/comparison/prompt.rs
use super::ComparisonPair;

/// Builds the single prompt covering every uncached pair of a batch. Each
/// pair carries its `Item <i>.<j>` identifier so the response can be joined
/// back to the right pair regardless of answer order.
pub fn build_comparison_prompt(pairs: &[ComparisonPair]) -> String {
    let mut prompt = String::from(
        "You are reconciling two lists of insured property descriptions. \
         For each numbered pair below, estimate the probability (0-100%) that \
         both descriptions refer to the same underlying property.\n\n",
    );

    for pair in pairs {
        prompt.push_str(&format!(
            "Item {}.{}: '{}' vs '{}'\n",
            pair.id.item, pair.id.candidate, pair.desc_a, pair.desc_b
        ));
    }

    prompt.push_str(
        "\nScoring guide:\n\
         - Descriptions naming the same function or property type score at least 60%.\n\
         - Descriptions naming the same location and purpose score at least 70%.\n\
         - Descriptions sharing only a broad category score at least 45%.\n\
         \n\
         Respond with exactly one line per item, in this format and nothing else:\n\
         Item <i>.<j>: <percent>%. <brief rationale>\n",
    );

    prompt
}
