// src/bin/generate_test_data.rs - Paired test-list generator for the reconciliation pipeline
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

use reconcile_lib::models::matching::PropertyRecord;

struct Template {
    base: &'static str,
    alt: &'static str,
}

const TEMPLATES: [Template; 12] = [
    Template {
        base: "Single Family Home with {beds} bedrooms and {baths} bathrooms",
        alt: "Single Family Residence - {beds}BR/{baths}BA",
    },
    Template {
        base: "Waterfront Vacation Property",
        alt: "Beachfront Holiday Property",
    },
    Template {
        base: "Downtown Commercial Office Space",
        alt: "Downtown Office Complex",
    },
    Template {
        base: "Retail Store with Storage",
        alt: "Retail Storefront with Warehouse",
    },
    Template {
        base: "Multi-unit Residential Complex",
        alt: "Apartment Building Complex",
    },
    Template {
        base: "Gardens and Recreation Area",
        alt: "Parks and Playground Areas",
    },
    Template {
        base: "Historic Restaurant Building",
        alt: "Vintage Dining Establishment",
    },
    Template {
        base: "Industrial Warehouse",
        alt: "Large Storage Facility",
    },
    Template {
        base: "Golf Course Clubhouse",
        alt: "Country Club Pavilion",
    },
    Template {
        base: "Marina Facility",
        alt: "Coastal Boating Center",
    },
    Template {
        base: "Shopping Mall",
        alt: "Retail Shopping Center",
    },
    Template {
        base: "Medical Office Building",
        alt: "Healthcare Office Space",
    },
];

const FORMAT_COUNT: usize = 5;

/// Generates paired property lists for exercising the reconciliation pipeline.
#[derive(Parser, Debug)]
#[command(name = "generate_test_data")]
struct Args {
    /// Number of list-A entries to generate
    #[arg(long, short, default_value_t = 1000)]
    count: usize,

    /// Fraction of list-A entries given a list-B counterpart
    #[arg(long, default_value_t = 0.7)]
    match_rate: f64,

    /// Directory receiving list1.json and list2.json
    #[arg(long, default_value = "data")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let match_rate = args.match_rate.clamp(0.0, 1.0);

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("Failed to create {}", args.out_dir.display()))?;

    info!(
        "Generating {} entries at {:.0}% match rate...",
        args.count,
        match_rate * 100.0
    );

    let mut rng = rand::thread_rng();
    let (list1, list2) = generate_paired_lists(args.count, match_rate, &mut rng);

    let list1_path = args.out_dir.join("list1.json");
    let list2_path = args.out_dir.join("list2.json");
    write_list(&list1_path, &list1)?;
    write_list(&list2_path, &list2)?;

    info!(
        "Files generated: {} ({} entries), {} ({} entries)",
        list1_path.display(),
        list1.len(),
        list2_path.display(),
        list2.len()
    );
    Ok(())
}

/// Builds both lists in one pass. A matched pair shares its numeric amounts
/// (optionally perturbed on the list-2 side, which is what separates Match
/// from Similar Match downstream); unmatched list-2 entries are appended at
/// the end to keep the list sizes comparable.
fn generate_paired_lists(
    count: usize,
    match_rate: f64,
    rng: &mut impl Rng,
) -> (Vec<PropertyRecord>, Vec<PropertyRecord>) {
    let mut list1 = Vec::with_capacity(count);
    let mut list2 = Vec::new();
    let mut unmatched_list2 = Vec::new();

    for _ in 0..count {
        let template = &TEMPLATES[rng.gen_range(0..TEMPLATES.len())];
        if rng.gen_bool(match_rate) {
            let generated = generate_property(template, false, rng);
            list2.push(matching_property(template, &generated, rng));
            list1.push(generated.record);
        } else {
            list1.push(generate_property(template, false, rng).record);
            unmatched_list2.push(generate_property(template, true, rng).record);
        }
    }

    let target_unmatched = count - (count as f64 * match_rate).floor() as usize;
    while unmatched_list2.len() < target_unmatched {
        let template = &TEMPLATES[rng.gen_range(0..TEMPLATES.len())];
        unmatched_list2.push(generate_property(template, true, rng).record);
    }
    unmatched_list2.truncate(target_unmatched);
    list2.extend(unmatched_list2);

    (list1, list2)
}

struct GeneratedProperty {
    record: PropertyRecord,
    limit: u64,
    mortgage: u64,
    beds: u32,
    baths: u32,
}

fn generate_property(template: &Template, use_alt: bool, rng: &mut impl Rng) -> GeneratedProperty {
    let beds = rng.gen_range(1..=5);
    let baths = rng.gen_range(1..=3);
    let pattern = if use_alt { template.alt } else { template.base };

    let limit = rng.gen_range(300_000..=6_000_000u64);
    let mortgage = (limit as f64 * rng.gen_range(0.6..0.9)).floor() as u64;

    GeneratedProperty {
        record: PropertyRecord {
            description: render_description(pattern, beds, baths),
            limit: format_amount(limit, rng.gen_range(0..FORMAT_COUNT), rng),
            mortgage_amount: format_amount(mortgage, rng.gen_range(0..FORMAT_COUNT), rng),
        },
        limit,
        mortgage,
        beds,
        baths,
    }
}

/// Rephrases `base` with the alternate wording, carrying the bed and bath
/// counts over. Amounts start from the same numbers; half the time each gets
/// a perturbation, which downstream reads as Similar Match instead of Match.
fn matching_property(
    template: &Template,
    base: &GeneratedProperty,
    rng: &mut impl Rng,
) -> PropertyRecord {
    let limit_variation = if rng.gen_bool(0.5) {
        0
    } else {
        rng.gen_range(50_000..=200_000)
    };
    let mortgage_variation = if rng.gen_bool(0.5) {
        0
    } else {
        rng.gen_range(25_000..=100_000)
    };

    PropertyRecord {
        description: render_description(template.alt, base.beds, base.baths),
        limit: format_amount(base.limit + limit_variation, rng.gen_range(0..FORMAT_COUNT), rng),
        mortgage_amount: format_amount(
            base.mortgage + mortgage_variation,
            rng.gen_range(0..FORMAT_COUNT),
            rng,
        ),
    }
}

fn render_description(pattern: &str, beds: u32, baths: u32) -> String {
    pattern
        .replacen("{beds}", &beds.to_string(), 1)
        .replacen("{baths}", &baths.to_string(), 1)
}

fn format_amount(n: u64, style: usize, rng: &mut impl Rng) -> String {
    match style {
        0 => format!("${}", n),
        1 => n.to_string(),
        2 => format!("{}M", n as f64 / 1_000_000.0),
        3 => format!("{}K", n as f64 / 1_000.0),
        _ => {
            let words = ["One", "Two", "Three", "Four"];
            let word = words[rng.gen_range(0..words.len())];
            let scale = if n >= 1_000_000 {
                "million"
            } else {
                "hundred thousand"
            };
            format!("{} {} Dollars", word, scale)
        }
    }
}

fn write_list(path: &Path, records: &[PropertyRecord]) -> Result<()> {
    let json =
        serde_json::to_string_pretty(records).context("Failed to serialize property list")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use reconcile_lib::matching::money::normalize_money;

    #[test]
    fn list_sizes_follow_the_match_rate() {
        let mut rng = StdRng::seed_from_u64(7);
        let count = 100;
        let (list1, list2) = generate_paired_lists(count, 0.7, &mut rng);

        assert_eq!(list1.len(), count);
        // matched pairs plus exactly count - floor(count * rate) unmatched
        let target_unmatched = count - 70;
        assert!(list2.len() >= target_unmatched);
        assert!(list2.len() <= count + target_unmatched);
    }

    #[test]
    fn zero_match_rate_still_balances_list_two() {
        let mut rng = StdRng::seed_from_u64(7);
        let (list1, list2) = generate_paired_lists(50, 0.0, &mut rng);
        assert_eq!(list1.len(), 50);
        assert_eq!(list2.len(), 50);
    }

    #[test]
    fn rendered_descriptions_substitute_counts() {
        let rendered = render_description(TEMPLATES[0].base, 4, 2);
        assert_eq!(
            rendered,
            "Single Family Home with 4 bedrooms and 2 bathrooms"
        );
        assert_eq!(
            render_description(TEMPLATES[0].alt, 4, 2),
            "Single Family Residence - 4BR/2BA"
        );
    }

    #[test]
    fn numeric_styles_survive_money_normalization() {
        let mut rng = StdRng::seed_from_u64(7);
        for style in 0..4 {
            let rendered = format_amount(1_200_000, style, &mut rng);
            assert_eq!(normalize_money(&rendered), 1_200_000.0, "style {}", style);
        }

        // the spelled-out style carries no digits at all
        let wordy = format_amount(1_200_000, 4, &mut rng);
        assert!(wordy.ends_with("million Dollars"));
        assert!(normalize_money(&wordy).is_nan());
    }

    #[test]
    fn matched_pairs_share_amounts_up_to_perturbation() {
        let mut rng = StdRng::seed_from_u64(21);
        let template = &TEMPLATES[1];
        let base = generate_property(template, false, &mut rng);
        let counterpart = matching_property(template, &base, &mut rng);

        assert_eq!(counterpart.description, template.alt);
        let counterpart_limit = normalize_money(&counterpart.limit);
        if !counterpart_limit.is_nan() {
            // M/K formatting can shift the value by an ulp, hence the slack
            let delta = counterpart_limit - base.limit as f64;
            assert!(delta.abs() < 1.0 || (49_999.0..=200_001.0).contains(&delta));
        }
    }
}
