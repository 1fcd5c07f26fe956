use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use study_questions::config::ModelOptions;
use study_questions::error::ModelError;
use study_questions::models::ModelResponse;
use study_questions::orchestrator::FileState;
use study_questions::services::QuestionWriter;
use study_questions::{process_file, App, Config, ModelClient, QuestionSet, RunContext};

/// 按脚本依次返回结果的假模型客户端，脚本用完后一律超时
struct ScriptedClient {
    script: Mutex<VecDeque<Result<ModelResponse, ModelError>>>,
    calls: Mutex<usize>,
    /// 第 n 次调用时置位的中断标志（模拟请求进行中按下 Ctrl-C）
    interrupt_on: Option<(usize, Arc<AtomicBool>)>,
}

impl ScriptedClient {
    fn new(script: Vec<Result<ModelResponse, ModelError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
            interrupt_on: None,
        }
    }

    fn interrupting_at(mut self, call: usize, flag: Arc<AtomicBool>) -> Self {
        self.interrupt_on = Some((call, flag));
        self
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ModelClient for ScriptedClient {
    fn model_name(&self) -> &str {
        "fake-model:1b"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _options: &ModelOptions,
    ) -> Result<ModelResponse, ModelError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if let Some((at, flag)) = &self.interrupt_on {
            if *at == call {
                flag.store(true, Ordering::SeqCst);
            }
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(timeout()))
    }
}

fn timeout() -> ModelError {
    ModelError::Timeout {
        endpoint: "http://localhost:11434/api/generate".to_string(),
        timeout_secs: 120,
    }
}

/// 一次完整的回复：每种题型各一道
fn four_questions(topic: &str, prompt_tokens: u64, completion_tokens: u64) -> Result<ModelResponse, ModelError> {
    let raw_text = format!(
        r#"Here are your questions:
```json
[
  {{"type": "multiple_choice", "question": "Which statement about {t} is correct?",
    "options": ["A) It is a gas", "B) It is a process", "C) It is a planet", "D) It is a color"],
    "correct_answer": "B", "explanation": "{t} is a process."}},
  {{"type": "short_answer", "question": "Define {t}.", "answer": "A biological process.", "explanation": "See the lecture."}},
  {{"type": "true_false", "statement": "{t} happens in cells.", "is_true": true, "explanation": "It does."}},
  {{"type": "essay", "question": "Discuss the importance of {t}.", "guidance": "Mention energy and structure."}}
]
```"#,
        t = topic
    );
    Ok(ModelResponse {
        raw_text,
        prompt_tokens,
        completion_tokens,
        duration: Duration::from_millis(5),
    })
}

/// 两段各约 50 字符的文本，分块上限 80 时正好切成两块
const TWO_PARAGRAPHS: &str = "Photosynthesis converts light into chemical energy.\n\nRespiration releases the stored energy inside cells.";

fn test_config(input: &Path, output: &Path) -> Config {
    let mut config = Config::default();
    config.question_generation.max_chunk_size = 80;
    config.question_generation.questions_per_chunk = 4;
    config.question_generation.max_retries = 2;
    config.question_generation.text_input_dir = input.display().to_string();
    config.question_generation.questions_output_dir = output.display().to_string();
    config
}

fn read_set(path: &Path) -> QuestionSet {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_two_chunks_produce_eight_questions_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&input).unwrap();
    let source = input.join("biology.txt");
    std::fs::write(&source, TWO_PARAGRAPHS).unwrap();

    let config = test_config(&input, &output);
    let client = ScriptedClient::new(vec![
        four_questions("photosynthesis", 100, 40),
        four_questions("respiration", 110, 45),
    ]);
    let writer = QuestionWriter::new(&output);
    let mut run = RunContext::new();

    let report = process_file(&client, &config, &writer, &source, 1, &mut run).await;

    assert_eq!(report.state, FileState::Written);
    assert_eq!(report.chunk_count, 2);
    assert_eq!(report.failed_chunks, 0);
    assert_eq!(report.question_count, 8);
    assert_eq!(client.calls(), 2);

    let set = read_set(&output.join("biology_questions.json"));
    assert_eq!(set.source_file, "biology.txt");
    assert_eq!(set.model_used, "fake-model:1b");
    assert_eq!(set.total_questions, 8);
    assert_eq!(set.token_usage_total.prompt_tokens, 210);
    assert_eq!(set.token_usage_total.completion_tokens, 85);
    assert_eq!(run.token_usage, set.token_usage_total);

    let chunks: Vec<usize> = set.questions.iter().map(|r| r.source_chunk).collect();
    assert_eq!(chunks, vec![1, 1, 1, 1, 2, 2, 2, 2]);
    assert!(set.questions[0].question.prompt_text().contains("photosynthesis"));
    assert!(set.questions[4].question.prompt_text().contains("respiration"));
}

#[tokio::test]
async fn test_retry_then_exhaustion_keeps_partial_result() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&input).unwrap();
    let source = input.join("cells.txt");
    std::fs::write(&source, TWO_PARAGRAPHS).unwrap();

    let config = test_config(&input, &output);
    // 第 1 块：超时两次后成功；第 2 块：一直超时
    let client = ScriptedClient::new(vec![
        Err(timeout()),
        Err(timeout()),
        four_questions("photosynthesis", 100, 40),
    ]);
    let writer = QuestionWriter::new(&output);
    let mut run = RunContext::new();

    let report = process_file(&client, &config, &writer, &source, 1, &mut run).await;

    assert_eq!(client.calls(), 6);
    assert_eq!(report.state, FileState::Written);
    assert_eq!(report.question_count, 4);
    assert_eq!(report.failed_chunks, 1);
    assert!(run.warnings.iter().any(|w| w.contains("分块 2/2")));

    let set = read_set(&output.join("cells_questions.json"));
    assert_eq!(set.total_questions, 4);
    assert!(set.questions.iter().all(|r| r.source_chunk == 1));
    assert_eq!(set.token_usage_total.total(), 140);
}

#[tokio::test]
async fn test_file_without_valid_questions_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&input).unwrap();
    let source = input.join("notes.txt");
    std::fs::write(&source, "A single short paragraph about enzymes.").unwrap();

    let config = test_config(&input, &output);
    let client = ScriptedClient::new(vec![Ok(ModelResponse {
        raw_text: "I'm sorry, I can't produce questions for this.".to_string(),
        prompt_tokens: 30,
        completion_tokens: 12,
        duration: Duration::from_millis(5),
    })]);
    let writer = QuestionWriter::new(&output);
    let mut run = RunContext::new();

    let report = process_file(&client, &config, &writer, &source, 1, &mut run).await;

    assert!(matches!(report.state, FileState::Failed(_)));
    assert_eq!(report.question_count, 0);
    assert!(report.output_path.is_none());
    assert!(!output.join("notes_questions.json").exists());
    // 回复被丢弃也要计入用量
    assert_eq!(run.token_usage.total(), 42);
    assert!(run.warnings.iter().any(|w| w.contains("notes.txt")));
}

#[test]
fn test_batch_continues_after_failed_file() {
    tokio_test::block_on(async {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir_all(&input).unwrap();
        // 按文件名排序：a_empty.txt 先处理且不调用模型
        std::fs::write(input.join("a_empty.txt"), "   \n\n  ").unwrap();
        std::fs::write(input.join("b_lecture.txt"), "Mitochondria produce ATP for the cell.").unwrap();
        std::fs::write(input.join("ignored.md"), "not a text file").unwrap();

        let config = test_config(&input, &output);
        let client = ScriptedClient::new(vec![four_questions("mitochondria", 50, 20)]);
        let app = App::with_client(config, client);

        let run = app.run().await.unwrap();

        assert_eq!(run.files.len(), 2);
        assert_eq!(run.files[0].source_file, "a_empty.txt");
        assert!(matches!(run.files[0].state, FileState::Failed(_)));
        assert_eq!(run.files[1].state, FileState::Written);
        assert_eq!(run.written_count(), 1);
        assert_eq!(run.failed_count(), 1);
        assert_eq!(run.total_questions(), 4);
        assert!(output.join("b_lecture_questions.json").exists());
        assert!(!output.join("a_empty_questions.json").exists());
    });
}

#[tokio::test]
async fn test_interrupt_before_run_processes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("lecture.txt"), TWO_PARAGRAPHS).unwrap();

    let config = test_config(&input, &output);
    let app = App::with_client(config, ScriptedClient::new(Vec::new()));
    app.interrupt_handle().store(true, Ordering::SeqCst);

    let run = app.run().await.unwrap();

    assert!(run.is_interrupted());
    assert!(run.files.is_empty());
    assert!(!output.join("lecture_questions.json").exists());
}

#[tokio::test]
async fn test_interrupt_mid_file_discards_file_and_keeps_earlier_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&input).unwrap();
    let first = input.join("a_cells.txt");
    let second = input.join("b_energy.txt");
    std::fs::write(&first, "Cells are the basic unit of life.").unwrap();
    std::fs::write(&second, TWO_PARAGRAPHS).unwrap();

    let config = test_config(&input, &output);
    let flag = Arc::new(AtomicBool::new(false));
    // 第 2 次调用是 b_energy.txt 的第 1 块，请求进行中收到中断
    let client = ScriptedClient::new(vec![
        four_questions("cells", 40, 20),
        four_questions("photosynthesis", 100, 40),
        four_questions("respiration", 110, 45),
    ])
    .interrupting_at(2, flag.clone());
    let writer = QuestionWriter::new(&output);
    let mut run = RunContext::with_interrupt(flag);

    let first_report = process_file(&client, &config, &writer, &first, 1, &mut run).await;
    assert_eq!(first_report.state, FileState::Written);
    let first_output = output.join("a_cells_questions.json");
    let written_before = std::fs::read_to_string(&first_output).unwrap();

    let report = process_file(&client, &config, &writer, &second, 2, &mut run).await;

    // 进行中的请求正常完成，第 2 块不再调用
    assert_eq!(client.calls(), 2);
    assert_eq!(report.state, FileState::Failed("运行被中断".to_string()));
    assert_eq!(report.chunk_count, 2);
    assert!(report.output_path.is_none());
    assert!(!output.join("b_energy_questions.json").exists());
    assert_eq!(std::fs::read_to_string(&first_output).unwrap(), written_before);
    assert_eq!(run.token_usage.total(), 60 + 140);
}

#[tokio::test]
async fn test_model_failure_reason_reaches_file_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&input).unwrap();
    let source = input.join("offline.txt");
    std::fs::write(&source, "Enzymes lower activation energy.").unwrap();

    let config = test_config(&input, &output);
    // 脚本为空：每次调用都超时
    let client = ScriptedClient::new(Vec::new());
    let writer = QuestionWriter::new(&output);
    let mut run = RunContext::new();

    let report = process_file(&client, &config, &writer, &source, 1, &mut run).await;

    assert_eq!(client.calls(), 3);
    match &report.state {
        FileState::Failed(reason) => {
            assert!(reason.contains("没有生成有效题目"));
            assert!(reason.contains("超时"), "reason: {}", reason);
        }
        other => panic!("unexpected state: {:?}", other),
    }
    assert!(!output.join("offline_questions.json").exists());
}
