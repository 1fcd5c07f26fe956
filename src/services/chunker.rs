//! 文本分块服务 - 业务能力层
//!
//! 只负责把一份文本切成不超过上限的分块，不关心模型和流程
//!
//! 切分优先级：段落（空行 / 幻灯片标记） → 句子 → 单词 → 字符

use crate::models::TextChunk;

const PARAGRAPH_JOINER: &str = "\n\n";
const SENTENCE_JOINER: &str = " ";

/// 待打包的文本片段
struct Piece {
    text: String,
    /// 拼接到已有分块后面时使用的分隔符
    joiner: &'static str,
}

/// 文本分块服务
pub struct Chunker {
    max_chunk_size: usize,
}

impl Chunker {
    pub fn new(max_chunk_size: usize) -> Self {
        Self {
            max_chunk_size: max_chunk_size.max(1),
        }
    }

    /// 切分文本
    ///
    /// # 返回
    /// 每个分块的字符数都不超过 `max_chunk_size`；空文本返回空列表
    pub fn split(&self, source_file: &str, text: &str) -> Vec<TextChunk> {
        let mut pieces = Vec::new();

        for paragraph in split_paragraphs(text) {
            if char_len(paragraph) <= self.max_chunk_size {
                pieces.push(Piece {
                    text: paragraph.to_string(),
                    joiner: PARAGRAPH_JOINER,
                });
                continue;
            }

            // 段落过长，退回到句子边界
            let mut first = true;
            for sentence in split_sentences(paragraph) {
                for part in self.fit_sentence(sentence) {
                    pieces.push(Piece {
                        text: part,
                        joiner: if first {
                            PARAGRAPH_JOINER
                        } else {
                            SENTENCE_JOINER
                        },
                    });
                    first = false;
                }
            }
        }

        self.pack(source_file, pieces)
    }

    /// 把片段贪心地装进分块
    fn pack(&self, source_file: &str, pieces: Vec<Piece>) -> Vec<TextChunk> {
        let mut contents: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for piece in pieces {
            let piece_len = char_len(&piece.text);

            if current.is_empty() {
                current = piece.text;
                current_len = piece_len;
                continue;
            }

            let joiner_len = char_len(piece.joiner);
            if current_len + joiner_len + piece_len <= self.max_chunk_size {
                current.push_str(piece.joiner);
                current.push_str(&piece.text);
                current_len += joiner_len + piece_len;
            } else {
                contents.push(std::mem::take(&mut current));
                current = piece.text;
                current_len = piece_len;
            }
        }

        if !current.is_empty() {
            contents.push(current);
        }

        contents
            .into_iter()
            .enumerate()
            .map(|(index, content)| TextChunk::new(source_file, index, content))
            .collect()
    }

    /// 把一个句子切成不超过上限的若干段
    ///
    /// 句子过长时按单词切分，单词本身过长时才在字符处硬切
    fn fit_sentence(&self, sentence: &str) -> Vec<String> {
        if char_len(sentence) <= self.max_chunk_size {
            return vec![sentence.to_string()];
        }

        let mut parts = Vec::new();
        let mut current = String::new();
        let mut current_len = 0;

        for word in sentence.split_whitespace() {
            let word_len = char_len(word);

            if word_len > self.max_chunk_size {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let chars: Vec<char> = word.chars().collect();
                for window in chars.chunks(self.max_chunk_size) {
                    parts.push(window.iter().collect());
                }
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
                current_len = word_len;
            } else if current_len + 1 + word_len <= self.max_chunk_size {
                current.push(' ');
                current.push_str(word);
                current_len += 1 + word_len;
            } else {
                parts.push(std::mem::take(&mut current));
                current.push_str(word);
                current_len = word_len;
            }
        }

        if !current.is_empty() {
            parts.push(current);
        }

        parts
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// PPTX 提取工具写出的幻灯片标记，例如 `=== SLIDE 3 ===`
fn is_slide_marker(line: &str) -> bool {
    line.strip_prefix("=== SLIDE ")
        .and_then(|rest| rest.strip_suffix(" ==="))
        .map(|number| !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// 按空行切段落；幻灯片标记行开启新段落（标记本身保留在段首）
fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start: Option<usize> = None;
    let mut end = 0;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if let Some(s) = start.take() {
                paragraphs.push(text[s..end].trim());
            }
            continue;
        }

        if is_slide_marker(trimmed) {
            if let Some(s) = start.take() {
                paragraphs.push(text[s..end].trim());
            }
        }

        if start.is_none() {
            start = Some(line_start);
        }
        end = offset;
    }

    if let Some(s) = start {
        paragraphs.push(text[s..end].trim());
    }

    paragraphs.retain(|p| !p.is_empty());
    paragraphs
}

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '。' | '！' | '？')
}

fn is_cjk_terminal(c: char) -> bool {
    matches!(c, '。' | '！' | '？')
}

fn is_closing_mark(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '”' | '’' | '」')
}

/// 按句末标点切句子
///
/// 英文标点后必须跟空白才算句子结束（避免切开 `3.14`、`e.g.x`）；中文标点直接切
fn split_sentences(paragraph: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = paragraph.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i].1;
        if !is_terminal(c) {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < chars.len() && (is_terminal(chars[j].1) || is_closing_mark(chars[j].1)) {
            j += 1;
        }

        let at_end = j == chars.len();
        if at_end || chars[j].1.is_whitespace() || is_cjk_terminal(c) {
            let end = if at_end { paragraph.len() } else { chars[j].0 };
            let sentence = paragraph[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
        i = j;
    }

    let rest = paragraph[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }

    sentences
}
