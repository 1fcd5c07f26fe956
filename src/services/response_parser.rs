//! 模型输出解析 - 业务能力层
//!
//! 模型输出不保证是合法 JSON：前后可能有说明文字、markdown 代码块，
//! 也可能因为 `num_predict` 截断而缺少结尾。解析分两步：
//!
//! 1. 定位第一个顶层 `{` / `[` 及其配对的结束符，严格解码
//! 2. 失败时做一次修复（去掉多余逗号、补全字符串和括号）后再解码一次
//!
//! 解码成功后逐条校验，不合格的条目丢弃并记录警告，不会中断整个分块

use crate::error::{ParseError, ValidationError};
use crate::models::question::{normalize_text, Question, QuestionType};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// 在原始文本中定位到的 JSON 片段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    pub text: &'a str,
    /// 是否找到了配对的结束符
    pub complete: bool,
}

/// 解析模型输出
///
/// # 参数
/// - `raw_text`: 模型原始输出
/// - `expected_count`: 期望的题目数量（只用于产生警告）
/// - `question_types`: 本次请求允许的题型
///
/// # 返回
/// 返回 (按原顺序排列的有效题目, 警告列表)
pub fn parse(
    raw_text: &str,
    expected_count: usize,
    question_types: &[QuestionType],
) -> (Vec<Question>, Vec<String>) {
    let mut warnings = Vec::new();

    let entries = match decode_entries(raw_text) {
        Ok((entries, repaired)) => {
            if repaired {
                warnings.push("模型输出不是合法 JSON，修复后解析成功".to_string());
            }
            entries
        }
        Err(e) => {
            warnings.push(format!("模型输出无法解析，本分块不产出题目: {}", e));
            return (Vec::new(), warnings);
        }
    };

    let option_prefix = Regex::new(r"^\(?[A-Da-d][\.\):]\s+").ok();
    let mut seen = HashSet::new();
    let mut questions = Vec::new();

    for (i, entry) in entries.iter().enumerate() {
        match validate_entry(entry, question_types, option_prefix.as_ref()) {
            Ok(question) => {
                if !seen.insert(question.normalized_prompt()) {
                    warnings.push(format!("第 {} 条题目与前面的题目重复，已去重", i + 1));
                    continue;
                }
                questions.push(question);
            }
            Err(e) => {
                warnings.push(format!("第 {} 条题目校验失败，已丢弃: {}", i + 1, e));
            }
        }
    }

    if questions.len() < expected_count {
        warnings.push(format!(
            "有效题目 {} 道，少于期望的 {} 道",
            questions.len(),
            expected_count
        ));
    }

    debug!(
        "解析完成: 条目 {}, 有效题目 {}, 警告 {}",
        entries.len(),
        questions.len(),
        warnings.len()
    );

    (questions, warnings)
}

/// 定位第一个顶层 JSON 结构
///
/// 括号计数时忽略字符串字面量中的括号；找不到配对结束符时返回从开始到文本末尾的片段
pub fn locate_block(text: &str) -> Option<Block<'_>> {
    let start = text.find(['{', '['])?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Some(Block {
                        text: &text[start..end],
                        complete: true,
                    });
                }
            }
            _ => {}
        }
    }

    Some(Block {
        text: text[start..].trim_end(),
        complete: false,
    })
}

/// 一次性修复常见的 JSON 语法问题
///
/// - 去掉结束符（或文本末尾）之前多余的逗号
/// - 补全未闭合的字符串
/// - 按嵌套顺序补全缺失的 `}` / `]`，并纠正错配的结束符
pub fn repair(block: &str) -> String {
    let chars: Vec<char> = block.chars().collect();
    let mut out = String::with_capacity(block.len() + 8);
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' => {
                stack.push('}');
                out.push(c);
            }
            '[' => {
                stack.push(']');
                out.push(c);
            }
            '}' | ']' => {
                // 多余的结束符直接丢弃
                if let Some(expected) = stack.pop() {
                    out.push(expected);
                }
            }
            ',' => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if !matches!(next, None | Some('}') | Some(']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    if in_string {
        if escaped {
            out.pop();
        }
        out.push('"');
    }

    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    if out.ends_with(':') {
        out.push_str(" null");
    }

    while let Some(closer) = stack.pop() {
        out.push(closer);
    }

    out
}

/// 定位并解码出题目条目列表
///
/// 返回 (条目列表, 是否经过修复)
fn decode_entries(raw_text: &str) -> Result<(Vec<Value>, bool), ParseError> {
    let block = locate_block(raw_text).ok_or(ParseError::NoStructuredBlock)?;

    // 没有配对结束符说明输出被截断，严格解码必然失败，直接修复
    let strict = if block.complete {
        serde_json::from_str::<Value>(block.text).map_err(|e| e.to_string())
    } else {
        Err("输出被截断".to_string())
    };

    let (value, repaired) = match strict {
        Ok(value) => (value, false),
        Err(strict_err) => {
            debug!("严格解码失败，尝试修复: {}", strict_err);
            let fixed = repair(block.text);
            let value = serde_json::from_str::<Value>(&fixed).map_err(|e| {
                ParseError::Unrecoverable(format!("{}; 修复后: {}", strict_err, e))
            })?;
            (value, true)
        }
    };

    Ok((entries_from_value(value)?, repaired))
}

/// 接受裸数组、`{"questions": [...]}` 或单个题目对象
fn entries_from_value(value: Value) -> Result<Vec<Value>, ParseError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(ParseError::UnexpectedShape),
            None if map.contains_key("type") => Ok(vec![Value::Object(map)]),
            None => Err(ParseError::UnexpectedShape),
        },
        _ => Err(ParseError::UnexpectedShape),
    }
}

/// 校验单个条目并转换为题目
fn validate_entry(
    entry: &Value,
    allowed: &[QuestionType],
    option_prefix: Option<&Regex>,
) -> Result<Question, ValidationError> {
    let obj = entry.as_object().ok_or(ValidationError::NotAnObject)?;

    let type_name = ["type", "question_type"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .ok_or(ValidationError::MissingField("type"))?;
    let question_type = QuestionType::parse_loose(type_name)
        .ok_or_else(|| ValidationError::UnknownType(type_name.to_string()))?;

    if !allowed.contains(&question_type) {
        return Err(ValidationError::TypeNotRequested(question_type.to_string()));
    }

    match question_type {
        QuestionType::MultipleChoice => {
            let prompt = required_text(obj, &["question", "prompt"], "question")?;
            let options = parse_options(obj, option_prefix)?;
            let correct_index = parse_correct_index(obj, &options, option_prefix)?;
            let explanation = required_text(obj, &["explanation"], "explanation")?;
            Ok(Question::MultipleChoice {
                prompt,
                options,
                correct_index,
                explanation,
            })
        }
        QuestionType::ShortAnswer => Ok(Question::ShortAnswer {
            prompt: required_text(obj, &["question", "prompt"], "question")?,
            answer: required_text(obj, &["answer", "correct_answer"], "answer")?,
            explanation: required_text(obj, &["explanation"], "explanation")?,
        }),
        QuestionType::TrueFalse => Ok(Question::TrueFalse {
            statement: required_text(obj, &["statement", "question", "prompt"], "statement")?,
            is_true: parse_truth(obj)?,
            explanation: required_text(obj, &["explanation"], "explanation")?,
        }),
        QuestionType::Essay => Ok(Question::Essay {
            prompt: required_text(obj, &["question", "prompt"], "question")?,
            guidance: required_text(
                obj,
                &["guidance", "explanation", "correct_answer", "answer"],
                "guidance",
            )?,
        }),
    }
}

/// 按候选键顺序取第一个存在的非空文本字段
fn required_text(
    obj: &Map<String, Value>,
    keys: &[&str],
    name: &'static str,
) -> Result<String, ValidationError> {
    let value = keys
        .iter()
        .find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
        .ok_or(ValidationError::MissingField(name))?;

    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err(ValidationError::InvalidField(name)),
    };

    if text.is_empty() {
        return Err(ValidationError::EmptyField(name));
    }
    Ok(text)
}

fn strip_option_prefix(option: &str, option_prefix: Option<&Regex>) -> String {
    let trimmed = option.trim();
    match option_prefix {
        Some(re) => re.replace(trimmed, "").trim().to_string(),
        None => trimmed.to_string(),
    }
}

/// 选择题选项：恰好 4 个、非空、互不相同
fn parse_options(
    obj: &Map<String, Value>,
    option_prefix: Option<&Regex>,
) -> Result<[String; 4], ValidationError> {
    let raw = obj
        .get("options")
        .ok_or(ValidationError::MissingField("options"))?
        .as_array()
        .ok_or(ValidationError::InvalidField("options"))?;

    let mut options = Vec::with_capacity(raw.len());
    for item in raw {
        let text = item
            .as_str()
            .ok_or(ValidationError::InvalidField("options"))?;
        let text = strip_option_prefix(text, option_prefix);
        if text.is_empty() {
            return Err(ValidationError::EmptyField("options"));
        }
        options.push(text);
    }

    if options.len() != 4 {
        return Err(ValidationError::OptionCount(options.len()));
    }

    let distinct: HashSet<String> = options.iter().map(|o| normalize_text(o)).collect();
    if distinct.len() != options.len() {
        return Err(ValidationError::DuplicateOptions);
    }

    options
        .try_into()
        .map_err(|v: Vec<String>| ValidationError::OptionCount(v.len()))
}

fn index_in_range(index: i64) -> Result<usize, ValidationError> {
    if (0..4).contains(&index) {
        Ok(index as usize)
    } else {
        Err(ValidationError::CorrectIndexOutOfRange {
            index,
            max_index: 3,
        })
    }
}

/// 正确答案索引
///
/// 优先读 `correct_index`；否则接受 `correct_answer` 为数字、选项字母（`B`、`B) ...`）或选项原文
fn parse_correct_index(
    obj: &Map<String, Value>,
    options: &[String; 4],
    option_prefix: Option<&Regex>,
) -> Result<usize, ValidationError> {
    if let Some(value) = obj.get("correct_index") {
        return match value {
            Value::Number(n) => n
                .as_i64()
                .ok_or(ValidationError::InvalidField("correct_index"))
                .and_then(index_in_range),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ValidationError::InvalidField("correct_index"))
                .and_then(index_in_range),
            _ => Err(ValidationError::InvalidField("correct_index")),
        };
    }

    let answer = ["correct_answer", "answer"]
        .iter()
        .find_map(|k| obj.get(*k))
        .ok_or(ValidationError::MissingField("correct_index"))?;

    match answer {
        Value::Number(n) => n
            .as_i64()
            .ok_or(ValidationError::InvalidField("correct_answer"))
            .and_then(index_in_range),
        Value::String(s) => index_from_answer_text(s, options, option_prefix),
        _ => Err(ValidationError::InvalidField("correct_answer")),
    }
}

fn letter_index(c: char) -> Option<usize> {
    match c.to_ascii_uppercase() {
        'A' => Some(0),
        'B' => Some(1),
        'C' => Some(2),
        'D' => Some(3),
        _ => None,
    }
}

fn index_from_answer_text(
    answer: &str,
    options: &[String; 4],
    option_prefix: Option<&Regex>,
) -> Result<usize, ValidationError> {
    let answer = answer.trim();

    // 与某个选项原文完全一致时优先采用，避免选项 "C" 被当成字母 C
    let exact = normalize_text(answer);
    if let Some(index) = options.iter().position(|o| normalize_text(o) == exact) {
        return Ok(index);
    }

    // 单个字母 "B"
    let mut chars = answer.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(index) = letter_index(c) {
            return Ok(index);
        }
    }

    // 去掉 "B) " 之类的前缀后再比较原文
    let normalized = normalize_text(&strip_option_prefix(answer, option_prefix));
    if let Some(index) = options.iter().position(|o| normalize_text(o) == normalized) {
        return Ok(index);
    }

    // "B) 线粒体"：原文对不上时按字母取
    if let Some(re) = option_prefix {
        if re.is_match(answer) {
            if let Some(index) = answer
                .trim_start_matches('(')
                .chars()
                .next()
                .and_then(letter_index)
            {
                return Ok(index);
            }
        }
    }

    if let Ok(index) = answer.parse::<i64>() {
        return index_in_range(index);
    }

    Err(ValidationError::InvalidField("correct_answer"))
}

/// 判断题答案：布尔值或 "true"/"false" 等字符串
fn parse_truth(obj: &Map<String, Value>) -> Result<bool, ValidationError> {
    let value = ["is_true", "answer", "correct_answer"]
        .iter()
        .find_map(|k| obj.get(*k))
        .ok_or(ValidationError::MissingField("is_true"))?;

    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "t" | "yes" => Ok(true),
            "false" | "f" | "no" => Ok(false),
            _ => Err(ValidationError::InvalidField("is_true")),
        },
        _ => Err(ValidationError::InvalidField("is_true")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"[
  {"type": "multiple_choice", "question": "Which organelle produces ATP?", "options": ["Nucleus", "Mitochondria", "Ribosome", "Golgi apparatus"], "correct_index": 1, "explanation": "Mitochondria run cellular respiration."},
  {"type": "short_answer", "question": "What is osmosis?", "answer": "Diffusion of water across a membrane.", "explanation": "Water moves toward higher solute concentration."},
  {"type": "true_false", "statement": "Plant cells have cell walls.", "is_true": true, "explanation": "Cellulose walls surround plant cells."},
  {"type": "essay", "question": "Compare mitosis and meiosis.", "guidance": "Cover number of divisions, ploidy, and purpose."}
]"#;

    fn all_types() -> Vec<QuestionType> {
        QuestionType::ALL.to_vec()
    }

    #[test]
    fn test_parse_well_formed_output() {
        let (questions, warnings) = parse(WELL_FORMED, 4, &all_types());

        assert_eq!(questions.len(), 4);
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
        assert_eq!(
            questions.iter().map(|q| q.question_type()).collect::<Vec<_>>(),
            QuestionType::ALL.to_vec()
        );
        match &questions[0] {
            Question::MultipleChoice {
                options,
                correct_index,
                ..
            } => {
                assert_eq!(options[*correct_index], "Mitochondria");
            }
            other => panic!("expected multiple choice, got {:?}", other),
        }
    }

    #[test]
    fn test_block_extracted_regardless_of_surrounding_prose() {
        let noisy = format!(
            "Sure! Here are your questions about cells:\n\n```json\n{}\n```\n\nLet me know if you need more [or fewer] questions {{:)}}.",
            WELL_FORMED
        );

        let block = locate_block(&noisy).unwrap();
        assert!(block.complete);
        assert_eq!(block.text, WELL_FORMED);

        let (clean, _) = parse(WELL_FORMED, 4, &all_types());
        let (questions, warnings) = parse(&noisy, 4, &all_types());
        assert_eq!(questions, clean);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_locate_block_ignores_delimiters_inside_strings() {
        let text = r#"prefix {"question": "What does ] or } mean \" [here"} suffix ]"#;
        let block = locate_block(text).unwrap();
        assert_eq!(
            block.text,
            r#"{"question": "What does ] or } mean \" [here"}"#
        );
        assert!(block.complete);
    }

    #[test]
    fn test_locate_block_none_without_delimiters() {
        assert!(locate_block("I could not generate any questions.").is_none());
        let (questions, warnings) = parse("I could not generate any questions.", 4, &all_types());
        assert!(questions.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_trailing_comma_repaired_to_same_questions() {
        let with_comma = r#"[
  {"type": "true_false", "statement": "The sun is a star.", "is_true": true, "explanation": "It is a G-type main-sequence star.",},
  {"type": "short_answer", "question": "Name the closest planet to the sun.", "answer": "Mercury", "explanation": "Mercury orbits at ~0.39 AU."},
]"#;
        let without_comma = r#"[
  {"type": "true_false", "statement": "The sun is a star.", "is_true": true, "explanation": "It is a G-type main-sequence star."},
  {"type": "short_answer", "question": "Name the closest planet to the sun.", "answer": "Mercury", "explanation": "Mercury orbits at ~0.39 AU."}
]"#;

        let (repaired, warnings) = parse(with_comma, 2, &all_types());
        let (clean, _) = parse(without_comma, 2, &all_types());

        assert_eq!(repaired.len(), 2);
        assert_eq!(repaired, clean);
        assert!(warnings.iter().any(|w| w.contains("修复")));
    }

    #[test]
    fn test_truncated_output_is_repaired() {
        let truncated = r#"Here you go:
[
  {"type": "short_answer", "question": "What is DNA?", "answer": "Deoxyribonucleic acid", "explanation": "It stores genetic information."},
  {"type": "essay", "question": "Explain natural selection.", "guidance": "Variation, inheritance, differential surviv"#;

        assert!(!locate_block(truncated).unwrap().complete);

        let (questions, warnings) = parse(truncated, 2, &all_types());
        assert_eq!(questions.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("修复")));
        assert_eq!(
            questions[1],
            Question::Essay {
                prompt: "Explain natural selection.".to_string(),
                guidance: "Variation, inheritance, differential surviv".to_string(),
            }
        );
    }

    #[test]
    fn test_repair_closes_strings_and_delimiters() {
        assert_eq!(repair(r#"[{"a": "b"#), r#"[{"a": "b"}]"#);
        assert_eq!(repair(r#"{"a": [1, 2,], }"#), r#"{"a": [1, 2] }"#);
        assert_eq!(repair(r#"{"a": [1, 2}"#), r#"{"a": [1, 2]}"#);
        assert_eq!(repair(r#"{"a":"#), r#"{"a": null}"#);
    }

    #[test]
    fn test_unrecoverable_output_yields_warning_not_panic() {
        let (questions, warnings) = parse("[{\"type\": multiple_choice ??? }]", 4, &all_types());
        assert!(questions.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("无法解析"));
    }

    #[test]
    fn test_duplicate_prompts_deduplicated_keeping_first() {
        let raw = r#"[
  {"type": "multiple_choice", "question": "Which gas do plants absorb?", "options": ["Oxygen", "Carbon dioxide", "Nitrogen", "Helium"], "correct_index": 1, "explanation": "Used in photosynthesis."},
  {"type": "multiple_choice", "question": "  which GAS do plants   absorb? ", "options": ["Oxygen", "Carbon dioxide", "Nitrogen", "Helium"], "correct_index": 1, "explanation": "Used in photosynthesis."}
]"#;

        let (questions, warnings) = parse(raw, 1, &all_types());
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].prompt_text(), "Which gas do plants absorb?");
        assert!(warnings.iter().any(|w| w.contains("重复")));
    }

    #[test]
    fn test_correct_index_out_of_range_is_dropped() {
        let raw = r#"[
  {"type": "multiple_choice", "question": "2 + 2 = ?", "options": ["3", "4", "5", "6"], "correct_index": 5, "explanation": "Basic arithmetic."},
  {"type": "true_false", "statement": "2 + 2 = 4", "is_true": "true", "explanation": "Basic arithmetic."}
]"#;

        let (questions, warnings) = parse(raw, 2, &all_types());
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_type(), QuestionType::TrueFalse);
        assert!(warnings.iter().any(|w| w.contains("超出范围")));
        assert!(warnings.iter().any(|w| w.contains("少于期望")));
    }

    #[test]
    fn test_multiple_choice_integrity_rules() {
        let raw = r#"[
  {"type": "multiple_choice", "question": "Three options?", "options": ["a", "b", "c"], "correct_index": 0, "explanation": "x"},
  {"type": "multiple_choice", "question": "Duplicate options?", "options": ["a", "A", "c", "d"], "correct_index": 0, "explanation": "x"},
  {"type": "multiple_choice", "question": "No explanation?", "options": ["a", "b", "c", "d"], "correct_index": 0, "explanation": "  "},
  {"type": "multiple_choice", "question": "", "options": ["a", "b", "c", "d"], "correct_index": 0, "explanation": "x"}
]"#;

        let (questions, warnings) = parse(raw, 4, &all_types());
        assert!(questions.is_empty());
        assert_eq!(warnings.len(), 5);
    }

    #[test]
    fn test_letter_style_answers_are_accepted() {
        let raw = r#"{"questions": [
  {"type": "multiple_choice", "question": "Capital of France?", "options": ["A) Berlin", "B) Paris", "C) Rome", "D) Madrid"], "correct_answer": "B", "explanation": "Paris is the capital."},
  {"type": "multiple_choice", "question": "Largest planet?", "options": ["A. Mars", "B. Venus", "C. Jupiter", "D. Earth"], "correct_answer": "C. Jupiter", "explanation": "Jupiter is the largest."},
  {"type": "multiple_choice", "question": "Smallest prime?", "options": ["1", "2", "3", "5"], "correct_answer": "2", "explanation": "2 is the smallest prime."}
]}"#;

        let (questions, _) = parse(raw, 3, &all_types());
        assert_eq!(questions.len(), 3);

        let picks: Vec<String> = questions
            .iter()
            .map(|q| match q {
                Question::MultipleChoice {
                    options,
                    correct_index,
                    ..
                } => options[*correct_index].clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(picks, vec!["Paris", "Jupiter", "2"]);
    }

    #[test]
    fn test_option_text_match_wins_over_letter() {
        let raw = r#"[
  {"type": "multiple_choice", "question": "Which language did Dennis Ritchie create?", "options": ["C", "C++", "Java", "Rust"], "correct_answer": "C", "explanation": "C was created at Bell Labs."},
  {"type": "multiple_choice", "question": "Which grade is the lowest passing grade?", "options": ["A", "D", "B", "C"], "correct_answer": "d", "explanation": "D is the lowest passing grade."},
  {"type": "multiple_choice", "question": "Which language is memory safe without GC?", "options": ["C", "C++", "Java", "Rust"], "correct_answer": "D", "explanation": "Rust uses ownership."}
]"#;

        let (questions, _) = parse(raw, 3, &all_types());
        let picks: Vec<String> = questions
            .iter()
            .map(|q| match q {
                Question::MultipleChoice {
                    options,
                    correct_index,
                    ..
                } => options[*correct_index].clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(picks, vec!["C", "D", "Rust"]);
    }

    #[test]
    fn test_types_outside_request_are_dropped() {
        let (questions, warnings) = parse(WELL_FORMED, 2, &[QuestionType::Essay]);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_type(), QuestionType::Essay);
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.contains("不在本次请求范围内"))
                .count(),
            3
        );
    }

    #[test]
    fn test_unexpected_top_level_shape() {
        let (questions, warnings) = parse(r#"{"note": "nothing here"}"#, 1, &all_types());
        assert!(questions.is_empty());
        assert!(warnings[0].contains("顶层结构"));
    }
}
