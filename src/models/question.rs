use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// 题型枚举
///
/// 题型集合是封闭的，新增题型必须同时修改提示词中的输出格式说明
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// 单项选择题
    MultipleChoice,
    /// 简答题
    ShortAnswer,
    /// 判断题
    TrueFalse,
    /// 论述题
    Essay,
}

impl QuestionType {
    /// 全部题型，按默认顺序排列
    pub const ALL: [QuestionType; 4] = [
        QuestionType::MultipleChoice,
        QuestionType::ShortAnswer,
        QuestionType::TrueFalse,
        QuestionType::Essay,
    ];

    /// 获取标准名称（与 JSON 中的 `type` 字段一致）
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::ShortAnswer => "short_answer",
            QuestionType::TrueFalse => "true_false",
            QuestionType::Essay => "essay",
        }
    }

    /// 宽松解析模型返回的题型名称
    ///
    /// 接受 `multiple-choice`、`Multiple Choice`、`true/false` 等常见写法
    pub fn parse_loose(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' || c == '/' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "multiple_choice" | "multiplechoice" | "mcq" | "choice" => {
                Some(QuestionType::MultipleChoice)
            }
            "short_answer" | "shortanswer" | "short" => Some(QuestionType::ShortAnswer),
            "true_false" | "truefalse" | "true_or_false" | "boolean" => {
                Some(QuestionType::TrueFalse)
            }
            "essay" | "long_answer" | "discussion" => Some(QuestionType::Essay),
            _ => None,
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 一道已通过校验的题目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Question {
    MultipleChoice {
        prompt: String,
        options: [String; 4],
        correct_index: usize,
        explanation: String,
    },
    ShortAnswer {
        prompt: String,
        answer: String,
        explanation: String,
    },
    TrueFalse {
        statement: String,
        is_true: bool,
        explanation: String,
    },
    Essay {
        prompt: String,
        guidance: String,
    },
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Question::MultipleChoice { .. } => QuestionType::MultipleChoice,
            Question::ShortAnswer { .. } => QuestionType::ShortAnswer,
            Question::TrueFalse { .. } => QuestionType::TrueFalse,
            Question::Essay { .. } => QuestionType::Essay,
        }
    }

    /// 题干（判断题为陈述句）
    pub fn prompt_text(&self) -> &str {
        match self {
            Question::MultipleChoice { prompt, .. }
            | Question::ShortAnswer { prompt, .. }
            | Question::Essay { prompt, .. } => prompt,
            Question::TrueFalse { statement, .. } => statement,
        }
    }

    /// 用于去重的归一化题干：小写、合并空白
    pub fn normalized_prompt(&self) -> String {
        normalize_text(self.prompt_text())
    }
}

/// 小写并合并连续空白
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 写入输出文件的题目记录，附带来源分块编号（从 1 开始）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub source_chunk: usize,
    #[serde(flatten)]
    pub question: Question,
}

/// Token 用量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.prompt_tokens += rhs.prompt_tokens;
        self.completion_tokens += rhs.completion_tokens;
    }
}

/// 单个源文件生成的全部题目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub source_file: String,
    pub generated_at: String,
    pub model_used: String,
    pub total_questions: usize,
    pub token_usage_total: TokenUsage,
    pub questions: Vec<QuestionRecord>,
}

impl QuestionSet {
    /// 创建空的题目集
    pub fn new(source_file: impl Into<String>, model_used: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            generated_at: chrono::Local::now().to_rfc3339(),
            model_used: model_used.into(),
            total_questions: 0,
            token_usage_total: TokenUsage::default(),
            questions: Vec::new(),
        }
    }

    /// 追加某个分块解析出的题目，保持原有顺序
    pub fn extend_from_chunk(&mut self, chunk_number: usize, questions: Vec<Question>) {
        self.questions
            .extend(questions.into_iter().map(|question| QuestionRecord {
                source_chunk: chunk_number,
                question,
            }));
        self.total_questions = self.questions.len();
    }

    pub fn add_usage(&mut self, usage: TokenUsage) {
        self.token_usage_total += usage;
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
