//! Dataset files: a header line `n d` followed by `n` rows of `d`
//! whitespace-separated values.

use std::path::Path;

use anyhow::{bail, Context, Result};
use hdrms_geometry::PointSet;

pub fn load_dataset(path: &Path) -> Result<PointSet> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    parse_dataset(&text).with_context(|| format!("Invalid dataset {}", path.display()))
}

/// Parse and normalize every dimension to a maximum of one
pub fn parse_dataset(text: &str) -> Result<PointSet> {
    let mut tokens = text.split_whitespace();
    let mut header = |name: &str| -> Result<usize> {
        let token = tokens.next().with_context(|| format!("missing {} in header", name))?;
        token
            .parse()
            .with_context(|| format!("bad {} {:?} in header", name, token))
    };
    let n = header("point count")?;
    let d = header("dimensionality")?;
    if d == 0 {
        bail!("dimensionality must be positive");
    }

    let values = tokens
        .map(|t| t.parse::<f64>().with_context(|| format!("bad value {:?}", t)))
        .collect::<Result<Vec<_>>>()?;
    if values.len() < n * d {
        bail!("expected {} values, found {}", n * d, values.len());
    }
    if let Some(v) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
        bail!("values must be finite and non-negative, found {}", v);
    }

    let mut rows: Vec<Vec<f64>> = values[..n * d].chunks(d).map(<[f64]>::to_vec).collect();
    normalize(&mut rows);
    Ok(PointSet::from_rows(rows)?)
}

/// Scale each column so its maximum is one; all-zero columns are left alone.
pub fn normalize(rows: &mut [Vec<f64>]) {
    let Some(d) = rows.first().map(Vec::len) else {
        return;
    };
    for col in 0..d {
        let max = rows.iter().map(|r| r[col]).fold(0.0, f64::max);
        if max > 0.0 {
            rows.iter_mut().for_each(|r| r[col] /= max);
        }
    }
}
