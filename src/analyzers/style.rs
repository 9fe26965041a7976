//! Minimal CSS reading for inline styles and `<style>` blocks

/// Root font size used to resolve `em` and `rem` lengths
const ROOT_FONT_PX: f64 = 16.0;

/// Returns the last value declared for `property` in a declaration block
pub(super) fn declared<'a>(block: &'a str, property: &str) -> Option<&'a str> {
    block
        .split(';')
        .filter_map(|declaration| declaration.split_once(':'))
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case(property))
        .map(|(_, value)| value.trim().trim_end_matches("!important").trim())
        .last()
}

/// Converts an absolute CSS length to pixels
///
/// Relative units other than `em`/`rem` (percentages, viewport units) return None.
pub(super) fn length_px(value: &str) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    if value == "0" {
        return Some(0.0);
    }

    let (number, factor) = if let Some(number) = value.strip_suffix("px") {
        (number, 1.0)
    } else if let Some(number) = value.strip_suffix("pt") {
        (number, 4.0 / 3.0)
    } else if let Some(number) = value.strip_suffix("rem") {
        (number, ROOT_FONT_PX)
    } else if let Some(number) = value.strip_suffix("em") {
        (number, ROOT_FONT_PX)
    } else {
        return None;
    };

    number.trim().parse::<f64>().ok().map(|n| n * factor)
}

/// Splits stylesheet text into `(selector list, declaration block)` pairs
///
/// At-rule wrappers are flattened: a rule inside `@media` is returned as if
/// it were top level.
pub(super) fn rules(stylesheet: &str) -> Vec<(&str, &str)> {
    stylesheet
        .split('}')
        .filter_map(|chunk| chunk.rsplit_once('{'))
        .map(|(prefix, block)| {
            let selectors = prefix.rsplit('{').next().unwrap_or(prefix);
            (selectors.trim(), block)
        })
        .filter(|(selectors, _)| !selectors.is_empty() && !selectors.starts_with('@'))
        .collect()
}

/// True when a selector list contains `name` as one of its plain selectors
pub(super) fn selects(selectors: &str, name: &str) -> bool {
    selectors
        .split(',')
        .any(|selector| selector.trim().eq_ignore_ascii_case(name))
}
