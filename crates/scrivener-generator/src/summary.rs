//! Rule-based abstract summary

/// Characters taken from the invention content
pub const SUMMARY_WINDOW: usize = 200;

/// A sentence break past this position ends the summary cleanly
const CUT_AFTER: usize = 150;

/// First 200 chars of the invention content, ending on a `。` or `，` found
/// past position 150, otherwise followed by an ellipsis
pub fn rule_summary(invention_content: &str) -> String {
    let chars: Vec<char> = invention_content.chars().collect();
    let window = &chars[..chars.len().min(SUMMARY_WINDOW)];
    let mut summary: String = window.iter().collect();
    if chars.len() <= SUMMARY_WINDOW {
        return summary;
    }

    let last_period = window.iter().rposition(|c| *c == '。');
    let last_comma = window.iter().rposition(|c| *c == '，');
    match (last_period, last_comma) {
        (Some(i), _) if i > CUT_AFTER => summary = window[..=i].iter().collect(),
        (_, Some(i)) if i > CUT_AFTER => summary = window[..=i].iter().collect(),
        _ => summary.push_str("..."),
    }
    summary
}
