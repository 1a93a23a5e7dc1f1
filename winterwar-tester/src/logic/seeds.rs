use anyhow::{Result, bail};

/// Seed used when the command line names none.
pub const DEFAULT_SEED: u64 = 1337;

/// Resolve CLI seed tokens into distinct numeric seeds, in the order given.
///
/// Negative integers fold onto their magnitude. `sweep:N` expands to the
/// seeds `0..N`.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut seeds: Vec<u64> = Vec::new();
    let mut push = |seed: u64| {
        if !seeds.contains(&seed) {
            seeds.push(seed);
        }
    };

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        if let Some(count) = token.strip_prefix("sweep:") {
            let Ok(count) = count.parse::<u64>() else {
                bail!("Unrecognized sweep size: {count}");
            };
            (0..count).for_each(&mut push);
            continue;
        }

        if let Ok(value) = token.parse::<u64>() {
            push(value);
            continue;
        }

        if let Ok(value) = token.parse::<i64>() {
            push(value.unsigned_abs());
            continue;
        }

        bail!("Unrecognized seed token: {token}");
    }

    if seeds.is_empty() {
        seeds.push(DEFAULT_SEED);
    }

    Ok(seeds)
}
