//! The deprecated textual variation spec syntax.

use super::{Location, VariationSpec};
use crate::error::ErrorKind;

pub(super) fn parse(src: &str) -> Result<VariationSpec, ErrorKind> {
    let malformed = |msg: String| ErrorKind::MalformedVariationSpec(format!("{msg} in '{src}'"));
    let mut spec = VariationSpec::new();
    for entry in src.split_whitespace() {
        let (locations, value) = entry
            .rsplit_once(':')
            .ok_or_else(|| malformed(format!("missing ':' in '{entry}'")))?;
        let value = value
            .parse::<f64>()
            .map_err(|_| malformed(format!("bad value '{value}'")))?;
        let location = locations.parse::<Location>()?;
        if spec.insert(location.clone(), value).is_some() {
            return Err(malformed(format!("location {location} given twice")));
        }
    }
    if spec.is_empty() {
        return Err(malformed("no values".into()));
    }
    let structured = spec
        .iter()
        .map(|(loc, value)| format!("({loc}): {value}"))
        .collect::<Vec<_>>()
        .join(", ");
    log::warn!("Consider using a structured variation spec {{{structured}}} instead of '{src}'");
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use font_types::Tag;

    use super::*;

    #[test]
    fn parse_textual_form() {
        let _ = env_logger::builder().is_test(true).try_init();
        let spec = parse("wght=0:10 wght=1:20 wght=1,wdth=0.5:30").unwrap();
        let wght = Tag::new(b"wght");
        let wdth = Tag::new(b"wdth");
        let expected = VariationSpec::new()
            .with(Location::new([(wght, 0.0)]).unwrap(), 10.0)
            .with(Location::new([(wght, 1.0)]).unwrap(), 20.0)
            .with(Location::new([(wdth, 0.5), (wght, 1.0)]).unwrap(), 30.0);
        assert_eq!(spec, expected);
    }

    #[test]
    fn bare_value_is_default_location() {
        let spec = parse(":5 ALPH=1:1").unwrap();
        assert_eq!(spec.iter().next(), Some((&Location::origin(), 5.0)));
    }

    #[test]
    fn malformed() {
        for bad in ["", "wght=1", "wght:1", "wght=x:1", "wght=1:y", "wght=0:1 wght=0:2"] {
            assert!(
                matches!(parse(bad), Err(ErrorKind::MalformedVariationSpec(_))),
                "{bad}"
            );
        }
    }
}
