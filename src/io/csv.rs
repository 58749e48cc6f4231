/*!
# CSV Export of Sample Sets

Writes drawn samples, optionally with their importance weights, to a CSV file
that a plotting tool can histogram. Enable via the `csv` feature.
*/

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::error::{Result, SamplingError};

/**
Saves a sample set as CSV.

The file has a header row `sample,value` (plus `weight` when `weights` is
given) followed by one row per draw, in draw order.

# Arguments

* `samples` - The drawn positions.
* `weights` - Optional importance weights, parallel to `samples`.
* `path` - The file to create (overwritten if it exists).

# Examples

```rust
use mini_montecarlo::io::csv::save_samples_csv;

let samples = [0.5, -1.25, 2.0];
let weights = [1.0, 0.5, 0.25];
save_samples_csv(&samples, Some(&weights), "/tmp/weighted_samples.csv")?;
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/
pub fn save_samples_csv<P: AsRef<Path>>(
    samples: &[f64],
    weights: Option<&[f64]>,
    path: P,
) -> Result<()> {
    if let Some(w) = weights {
        if w.len() != samples.len() {
            return Err(SamplingError::InvalidArgument(format!(
                "length mismatch: {} samples but {} weights",
                samples.len(),
                w.len()
            )));
        }
    }

    let mut wtr = Writer::from_writer(File::create(path)?);
    match weights {
        Some(weights) => {
            wtr.write_record(["sample", "value", "weight"])?;
            for (i, (s, w)) in samples.iter().zip(weights).enumerate() {
                wtr.write_record(&[i.to_string(), s.to_string(), w.to_string()])?;
            }
        }
        None => {
            wtr.write_record(["sample", "value"])?;
            for (i, s) in samples.iter().enumerate() {
                wtr.write_record(&[i.to_string(), s.to_string()])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
