use anyhow::{Context, Result, bail};
use std::collections::HashSet;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated seed list. Negative literals fold to their magnitude and
/// repeats are dropped, keeping first-seen order.
pub fn parse_seeds(csv: &str) -> Result<Vec<u64>> {
    let mut seeds = Vec::new();
    for token in split_csv(csv) {
        if let Ok(value) = token.parse::<u64>() {
            seeds.push(value);
            continue;
        }
        let value = token
            .parse::<i64>()
            .with_context(|| format!("invalid seed '{token}'"))?;
        seeds.push(value.unsigned_abs());
    }
    if seeds.is_empty() {
        bail!("at least one seed is required");
    }
    let mut seen = HashSet::new();
    seeds.retain(|seed| seen.insert(*seed));
    Ok(seeds)
}

/// Parse a comma-separated list of replay durations in milliseconds.
pub fn parse_durations(csv: &str) -> Result<Vec<f64>> {
    let durations = split_csv(csv)
        .into_iter()
        .map(|token| {
            let value = token
                .parse::<f64>()
                .with_context(|| format!("invalid duration '{token}'"))?;
            if !value.is_finite() || value <= 0.0 {
                bail!("duration '{token}' must be a positive number of milliseconds");
            }
            Ok(value)
        })
        .collect::<Result<Vec<_>>>()?;
    if durations.is_empty() {
        bail!("--durations needs at least one value");
    }
    Ok(durations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" alpha, ,beta,  gamma ");
        assert_eq!(parts, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn seeds_accept_signed_literals() {
        assert_eq!(parse_seeds("1337, -7,18446744073709551615").unwrap(), vec![
            1337,
            7,
            u64::MAX
        ]);
        assert_eq!(parse_seeds("1,2,1,-2,3").unwrap(), vec![1, 2, 3]);
        assert!(parse_seeds("abc").is_err());
        assert!(parse_seeds(" , ").is_err());
    }

    #[test]
    fn durations_must_be_positive_numbers() {
        assert_eq!(
            parse_durations("600, 2200.5").unwrap(),
            vec![600.0, 2_200.5]
        );
        assert!(parse_durations("600,-1").is_err());
        assert!(parse_durations("NaN").is_err());
        assert!(parse_durations("").is_err());
    }
}
