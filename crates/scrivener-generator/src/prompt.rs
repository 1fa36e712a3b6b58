//! Term-grounded prompts for claims and abstract generation

use crate::request::GenerationRequest;

const CLAIMS_SYSTEM: &str = "You are a strict Patent Examiner. \
You verify that every claim is fully supported by the description. \
Do not introduce any technical term that is not present in the provided invention content.";

const ABSTRACT_SYSTEM: &str = "You are a strict Patent Examiner. \
You verify that every technical term in the abstract is supported by the description.";

const CLAIMS_TASK: &str = "任务：撰写中文权利要求书草稿（JSON），并进行一致性自检。\n\n\
强制顺序（在你内部完成，不要输出过程文本）：\n\
1) 提取你即将在权利要求中使用的所有技术术语/部件名称（包括缩写/模块名/关键特征）。\n\
2) 对每个术语进行校验：必须能在【发明内容】或【关键技术特征】中找到原词或等价表述；\
如果找不到，就不得引入该术语，必须改用已存在的表述。\n\
3) 通过校验后再生成权利要求，并完整填写 term_map：\
每个术语必须有 definition，occurrences 至少包含 claim:1；如能对应到说明书内容，请尽量填写 spec:pN。\n\n\
输出要求：\n\
- 输出必须为 JSON，结构严格符合给定 JSON Schema（字段名不得变更）\n\
- 语言使用中文法言法语，避免绝对化/夸大/主观/商业用语\n\
- independent_claim.text / dependent_claims[].text 均为完整权利要求句子（不包含前置编号）\n\
- number/depends_on 均使用字符串（例如：\"1\"）\n\
- feature_refs 使用如 F1/F2 的引用（可为空），尽量只引用【关键技术特征】中的要点\n";

const ABSTRACT_TASK: &str = "任务：撰写中文专利摘要（JSON），并进行一致性自检。\n\n\
强制顺序（在你内部完成，不要输出过程文本）：\n\
1) 列出你将用于摘要的全部技术术语。\n\
2) 校验每个术语：必须能在【发明内容】中找到原词或等价表述；否则不得引入。\n\
3) 通过校验后再生成 summary。\n\n\
要求：\n\
- 输出必须为 JSON，结构严格符合给定 JSON Schema（字段名不得变更）\n\
- summary 为中文摘要正文，<= 500 字，客观表述，不含绝对化/夸大/主观用语\n\
- 内容应包含：技术领域、要解决的技术问题、技术方案要点、技术效果（客观）\n\n";

/// Claims prompt; `features` are `(key, name)` pairs from the feature index
pub fn claims_prompt(request: &GenerationRequest, features: &[(String, String)], max_dependent: usize) -> String {
    let listed: Vec<String> = features.iter().map(|(k, n)| format!("{}={}", k, n)).collect();
    format!(
        "{}\n\n{}- 从属权利要求：0~{} 项，均从属于更小编号的权利要求\n\n\
         发明名称：{}\n技术领域：{}\n发明内容：{}\n关键技术特征（可用）：[{}]\n",
        CLAIMS_SYSTEM,
        CLAIMS_TASK,
        max_dependent,
        request.title,
        request.technical_field,
        request.invention_content,
        listed.join(", ")
    )
}

/// Abstract prompt
pub fn abstract_prompt(request: &GenerationRequest) -> String {
    format!(
        "{}\n\n{}发明名称：{}\n技术领域：{}\n发明内容：{}\n",
        ABSTRACT_SYSTEM, ABSTRACT_TASK, request.title, request.technical_field, request.invention_content
    )
}

/// JSON schema of the claims contract
pub const CLAIMS_SCHEMA: &str = r#"{
  "type": "object",
  "required": ["independent_claim"],
  "properties": {
    "independent_claim": {
      "type": "object",
      "required": ["text"],
      "properties": {
        "number": {"type": "string"},
        "text": {"type": "string", "minLength": 10},
        "feature_refs": {"type": "array", "items": {"type": "string"}}
      }
    },
    "dependent_claims": {
      "type": "array",
      "maxItems": 8,
      "items": {
        "type": "object",
        "required": ["number", "text"],
        "properties": {
          "number": {"type": "string"},
          "depends_on": {"type": "string"},
          "text": {"type": "string", "minLength": 10},
          "feature_refs": {"type": "array", "items": {"type": "string"}}
        }
      }
    },
    "term_map": {
      "type": "object",
      "additionalProperties": {
        "type": "object",
        "properties": {
          "definition": {"type": "string"},
          "occurrences": {"type": "array", "items": {"type": "string"}}
        }
      }
    }
  }
}"#;

/// JSON schema of the abstract contract
pub const ABSTRACT_SCHEMA: &str = r#"{
  "type": "object",
  "required": ["summary"],
  "properties": {
    "summary": {"type": "string", "minLength": 30, "maxLength": 500},
    "main_figure_description": {"type": ["string", "null"]}
  }
}"#;
