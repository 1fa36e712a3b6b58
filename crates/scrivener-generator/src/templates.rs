//! Template assembly for the specification and the disclosure
//!
//! Neither section calls the model.

use crate::request::GenerationRequest;
use regex::Regex;
use scrivener_domain::{Disclosure, PseMatrix, Specification};
use std::sync::LazyLock;

/// Maximum number of worked examples kept in a disclosure
pub const MAX_EXAMPLES: usize = 3;

/// Minimum paragraph length (chars) for an unnumbered example
pub const MIN_EXAMPLE_PARAGRAPH_CHARS: usize = 50;

const DEFAULT_DRAWINGS: [&str; 2] = ["图1：本发明的整体结构示意图", "图2：关键部件的详细结构图"];

static EXAMPLE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"实施例\s*(\d+)[：:]").expect("example header pattern"));

static DRAWING_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"图\s*(\d+)\s*是(.+?)[，。；]",
        r"附图\s*(\d+)\s*显示(.+?)[，。；]",
        r"如图\s*(\d+)\s*所示(.+?)[，。；]",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("drawing reference pattern"))
    .collect()
});

/// "本发明涉及X，特别是关于X中的改进技术。"
pub fn format_technical_field(technical_field: &str) -> String {
    format!("本发明涉及{0}，特别是关于{0}中的改进技术。", technical_field)
}

/// Background wrapped in the standard lead-in and closing sentence
pub fn format_background(background: &str) -> String {
    format!(
        "在{0}领域中，现有技术存在以下问题：\n\n{0}\n\n因此，需要一种新的技术方案来解决上述问题。",
        background
    )
}

/// Invention content with purpose, scheme and boilerplate effects
pub fn format_invention_content(invention_content: &str) -> String {
    format!(
        "本发明的目的在于提供一种技术方案，能够解决现有技术中的问题。\n\n\
         本发明的技术方案如下：\n\n{}\n\n\
         本发明的有益效果包括：\n1. 提高了技术性能\n2. 降低了成本\n3. 简化了操作流程",
        invention_content
    )
}

/// Drawing list, or `None` when no description was given
pub fn format_drawings(drawings_description: Option<&str>) -> Option<String> {
    match drawings_description.map(str::trim) {
        None | Some("") => None,
        Some(d) => Some(format!("图1是{}的结构示意图。\n图2是图1的局部放大图。", d)),
    }
}

/// Embodiments with the lead-in and scope disclaimer
pub fn format_embodiments(embodiments: &str) -> String {
    format!(
        "以下结合具体实施例对本发明进行详细说明。\n\n{}\n\n\
         本领域技术人员应当理解，上述实施例仅用于说明本发明，而不应视为限制本发明的范围。",
        embodiments
    )
}

/// Assemble the specification
pub fn build_specification(request: &GenerationRequest) -> Specification {
    let mut spec = Specification {
        technical_field: format_technical_field(&request.technical_field),
        background_art: format_background(&request.background),
        invention_content: format_invention_content(&request.invention_content),
        description_of_drawings: format_drawings(request.drawings_description.as_deref()),
        embodiments: format_embodiments(&request.embodiments),
        content: String::new(),
    };
    spec.content = spec.render();
    spec
}

/// Assemble the disclosure from the embodiments and the matrix
pub fn build_disclosure(embodiments: &str, pse: Option<&PseMatrix>) -> Disclosure {
    let mut disclosure = Disclosure {
        detailed_description: detailed_description(embodiments, pse),
        examples: extract_examples(embodiments),
        drawings: extract_drawings(embodiments),
        content: String::new(),
    };
    disclosure.content = disclosure.render();
    disclosure
}

/// Embodiments followed by a problem/solution/effect listing
pub fn detailed_description(embodiments: &str, pse: Option<&PseMatrix>) -> String {
    let mut text = format!("以下对本发明的具体实施方式进行详细描述。\n\n{}", embodiments);
    let Some(pse) = pse else {
        return text;
    };
    text.push_str("\n\n本发明的技术方案基于以下分析：\n");
    let blocks = [
        ("需要解决的技术问题：", &pse.problems),
        ("提出的技术解决方案：", &pse.solutions),
        ("达到的技术效果：", &pse.effects),
    ];
    for (heading, items) in blocks {
        if items.is_empty() {
            continue;
        }
        text.push_str(&format!("\n{}\n", heading));
        for item in items {
            text.push_str(&format!("- {}\n", item));
        }
    }
    text
}

/// Numbered `实施例N：` blocks, else paragraphs longer than 50 chars; at most three
pub fn extract_examples(embodiments: &str) -> Vec<String> {
    let mut examples: Vec<String> = EXAMPLE_HEADER_RE
        .find_iter(embodiments)
        .filter_map(|header| {
            let rest = &embodiments[header.end()..];
            let end = ["实施例", "\n\n"]
                .iter()
                .filter_map(|stop| rest.find(stop))
                .min()
                .unwrap_or(rest.len());
            let body = rest[..end].trim();
            (!body.is_empty()).then(|| body.to_string())
        })
        .collect();

    if examples.is_empty() {
        examples = embodiments
            .split("\n\n")
            .map(str::trim)
            .filter(|p| p.chars().count() > MIN_EXAMPLE_PARAGRAPH_CHARS)
            .map(str::to_string)
            .collect();
    }
    examples.truncate(MAX_EXAMPLES);
    examples
}

/// Drawing references as `图N：...`, or two generic entries
pub fn extract_drawings(embodiments: &str) -> Vec<String> {
    let mut drawings = Vec::new();
    for re in DRAWING_RES.iter() {
        for caps in re.captures_iter(embodiments) {
            if let (Some(n), Some(desc)) = (caps.get(1), caps.get(2)) {
                drawings.push(format!("图{}：{}", n.as_str(), desc.as_str().trim()));
            }
        }
    }
    if drawings.is_empty() {
        drawings = DEFAULT_DRAWINGS.iter().map(|d| d.to_string()).collect();
    }
    drawings
}
