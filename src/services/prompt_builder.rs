//! 提示词构建 - 业务能力层
//!
//! 纯函数：同样的分块和配置总是得到同样的提示词。
//! 输出格式说明与 `response_parser` 接受的字段一一对应，修改时两边要同步。

use crate::models::{QuestionType, TextChunk};

/// 把 `total` 道题按题型轮流分配，余数给排在前面的题型
///
/// 返回的列表保持配置顺序，数量为 0 的题型被省略
pub fn distribute(question_types: &[QuestionType], total: usize) -> Vec<(QuestionType, usize)> {
    if question_types.is_empty() {
        return Vec::new();
    }

    let base = total / question_types.len();
    let remainder = total % question_types.len();

    question_types
        .iter()
        .enumerate()
        .map(|(i, t)| (*t, base + usize::from(i < remainder)))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// 单个题型的 JSON 形状说明
fn schema_line(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::MultipleChoice => {
            r#"{"type": "multiple_choice", "question": "<question text>", "options": ["<option A>", "<option B>", "<option C>", "<option D>"], "correct_index": <0-3>, "explanation": "<why the answer is correct>"}"#
        }
        QuestionType::ShortAnswer => {
            r#"{"type": "short_answer", "question": "<question text>", "answer": "<model answer>", "explanation": "<why the answer is correct>"}"#
        }
        QuestionType::TrueFalse => {
            r#"{"type": "true_false", "statement": "<statement to judge>", "is_true": <true|false>, "explanation": "<why it is true or false>"}"#
        }
        QuestionType::Essay => {
            r#"{"type": "essay", "question": "<essay prompt>", "guidance": "<key points a good answer covers>"}"#
        }
    }
}

/// 构建出题提示词
///
/// # 参数
/// - `chunk`: 文本分块
/// - `question_types`: 允许的题型（按配置顺序）
/// - `questions_per_chunk`: 本分块要求的题目数量
pub fn build(
    chunk: &TextChunk,
    question_types: &[QuestionType],
    questions_per_chunk: usize,
) -> String {
    let plan = distribute(question_types, questions_per_chunk)
        .into_iter()
        .map(|(t, count)| format!("- {} x {}", count, t))
        .collect::<Vec<_>>()
        .join("\n");

    let shapes = question_types
        .iter()
        .map(|t| schema_line(*t))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Based on the following educational content, generate exactly {count} study questions to help a student learn and review the material.

CONTENT:
{content}

QUESTIONS TO GENERATE:
{plan}

OUTPUT FORMAT:
Respond with a single JSON array containing exactly {count} objects. Each object must match one of these shapes:
{shapes}

RULES:
- multiple_choice questions have exactly 4 distinct options and correct_index is the 0-based position of the correct option.
- Every question must include a non-empty explanation (essay questions use guidance instead).
- Do not repeat a question.
- Test understanding, not just memorization: focus on key concepts, relationships, and practical applications.
- Output JSON only. No markdown fences, no commentary before or after the array.

Response (JSON only):"#,
        count = questions_per_chunk,
        content = chunk.content,
        plan = plan,
        shapes = shapes,
    )
}
