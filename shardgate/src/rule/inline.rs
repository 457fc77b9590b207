//! Inline data node expressions, e.g. `ds_${0..1}.t_order_${0..3}`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Error;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(?:->)?\{([^}]*)\}").unwrap());

/// Expand an inline expression into every name it describes.
///
/// Supports integer ranges (`${0..3}`), lists (`${['a', 'b']}`),
/// and comma-separated lists of expressions. Placeholders combine
/// as a cartesian product, leftmost varying slowest.
pub fn expand(expression: &str) -> Result<Vec<String>, Error> {
    let mut result = vec![];

    for segment in split(expression) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        result.extend(expand_segment(segment)?);
    }

    Ok(result)
}

fn expand_segment(segment: &str) -> Result<Vec<String>, Error> {
    let mut result = vec![String::new()];
    let mut position = 0;

    for captures in PLACEHOLDER.captures_iter(segment) {
        let (placeholder, inner) = match (captures.get(0), captures.get(1)) {
            (Some(placeholder), Some(inner)) => (placeholder, inner.as_str()),
            _ => continue,
        };

        let literal = &segment[position..placeholder.start()];
        let values = values(inner)?;

        result = result
            .iter()
            .flat_map(|prefix| {
                values
                    .iter()
                    .map(move |value| format!("{}{}{}", prefix, literal, value))
            })
            .collect();

        position = placeholder.end();
    }

    let tail = &segment[position..];
    if tail.contains("${") || tail.contains("$->{") {
        return Err(Error::InlineExpression(segment.to_string()));
    }

    Ok(result
        .into_iter()
        .map(|prefix| format!("{}{}", prefix, tail))
        .collect())
}

fn values(inner: &str) -> Result<Vec<String>, Error> {
    let inner = inner.trim();

    if let Some((start, end)) = inner.split_once("..") {
        let start: i64 = start
            .trim()
            .parse()
            .map_err(|_| Error::InlineExpression(inner.to_string()))?;
        let end: i64 = end
            .trim()
            .parse()
            .map_err(|_| Error::InlineExpression(inner.to_string()))?;
        if start > end {
            return Err(Error::InlineExpression(inner.to_string()));
        }
        return Ok((start..=end).map(|i| i.to_string()).collect());
    }

    let list = inner
        .strip_prefix('[')
        .and_then(|list| list.strip_suffix(']'))
        .unwrap_or(inner);

    let values: Vec<String> = list
        .split(',')
        .map(|value| value.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|value| !value.is_empty())
        .collect();

    if values.is_empty() {
        Err(Error::InlineExpression(inner.to_string()))
    } else {
        Ok(values)
    }
}

// Split on commas outside of placeholders.
fn split(expression: &str) -> Vec<&str> {
    let mut result = vec![];
    let mut depth = 0_usize;
    let mut start = 0;

    for (i, c) in expression.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                result.push(&expression[start..i]);
                start = i + 1;
            }
            _ => (),
        }
    }
    result.push(&expression[start..]);

    result
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_range_product() {
        assert_eq!(
            expand("ds_${0..1}.t_order_${0..1}").unwrap(),
            vec![
                "ds_0.t_order_0",
                "ds_0.t_order_1",
                "ds_1.t_order_0",
                "ds_1.t_order_1"
            ]
        );
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            expand("${['ds_a', \"ds_b\"]}.t_user").unwrap(),
            vec!["ds_a.t_user", "ds_b.t_user"]
        );
        assert_eq!(
            expand("ds_0.t_config, ds_1.t_config").unwrap(),
            vec!["ds_0.t_config", "ds_1.t_config"]
        );
        assert_eq!(
            expand("ds_$->{[0, 2]}.t_log").unwrap(),
            vec!["ds_0.t_log", "ds_2.t_log"]
        );
    }

    #[test]
    fn test_mixed_segments() {
        assert_eq!(
            expand("ds_0.t_a_${0..1}, ds_1.t_b").unwrap(),
            vec!["ds_0.t_a_0", "ds_0.t_a_1", "ds_1.t_b"]
        );
    }

    #[test]
    fn test_invalid() {
        assert!(expand("ds_${3..1}.t").is_err());
        assert!(expand("ds_${a..b}.t").is_err());
        assert!(expand("ds_${}.t").is_err());
        assert!(expand("ds_${0..1.t").is_err());
    }
}
