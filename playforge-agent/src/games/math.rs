//! Arithmetic quiz agent.

use super::html::escape;
use crate::agent::{AgentPriority, GameAgent};
use crate::config::{DifficultyLevel, GameConfig};
use crate::context::{AgentContext, GameArtifact};
use async_trait::async_trait;
use playforge_error::{Error, ErrorKind, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const QUESTION_COUNT: usize = 10;
pub const OPTION_COUNT: usize = 4;
const TIME_LIMIT_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "×")]
    Mul,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "×",
        }
    }

    fn apply(&self, a: u32, b: u32) -> u32 {
        match self {
            Operator::Add => a + b,
            Operator::Sub => a - b,
            Operator::Mul => a * b,
        }
    }

    fn for_difficulty(difficulty: DifficultyLevel) -> &'static [Operator] {
        match difficulty {
            DifficultyLevel::Easy | DifficultyLevel::Adaptive => &[Operator::Add],
            DifficultyLevel::Medium => &[Operator::Add, Operator::Sub],
            DifficultyLevel::Hard => &[Operator::Add, Operator::Sub, Operator::Mul],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathQuestion {
    pub left: u32,
    pub right: u32,
    pub operator: Operator,
    pub answer: u32,
    pub options: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathGameData {
    pub title: String,
    pub theme: String,
    pub questions: Vec<MathQuestion>,
    /// Seconds per game; zero when the timer is off.
    pub time_limit: u32,
    pub sound_enabled: bool,
    pub score_enabled: bool,
}

/// Largest operand for an age group.
pub fn max_operand(age_group: &str) -> u32 {
    match age_group {
        "3-5" => 5,
        "6-8" => 20,
        "9-12" => 100,
        _ => 10,
    }
}

/// Generates ten arithmetic questions sized to the player's age.
#[derive(Debug, Clone, Default)]
pub struct MathGameAgent {
    seed: Option<u64>,
}

impl MathGameAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic questions for a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn generate_data(&self, config: &GameConfig) -> MathGameData {
        let mut rng = self.rng();
        let max = max_operand(&config.age_group);
        let operators = Operator::for_difficulty(config.difficulty);

        let questions = (0..QUESTION_COUNT)
            .map(|_| generate_question(&mut rng, max, operators))
            .collect();

        MathGameData {
            title: config.title.clone(),
            theme: config.theme.clone(),
            questions,
            time_limit: if config.timer_enabled { TIME_LIMIT_SECS } else { 0 },
            sound_enabled: config.sound_enabled,
            score_enabled: config.score_enabled,
        }
    }
}

fn generate_question(rng: &mut impl Rng, max: u32, operators: &[Operator]) -> MathQuestion {
    let operator = operators.choose(rng).copied().unwrap_or(Operator::Add);
    let mut left = rng.gen_range(1..=max);
    let mut right = rng.gen_range(1..=max);
    if operator == Operator::Sub && left < right {
        std::mem::swap(&mut left, &mut right);
    }
    let answer = operator.apply(left, right);

    MathQuestion {
        left,
        right,
        operator,
        answer,
        options: generate_options(rng, answer, max),
    }
}

/// Four distinct options near the answer, shuffled.
///
/// Options stay within `0..=2*max`; products can exceed that, in which case
/// the upper bound stretches to the answer's neighbourhood.
fn generate_options(rng: &mut impl Rng, answer: u32, max: u32) -> Vec<u32> {
    let upper = if answer > max * 2 { answer + 4 } else { max * 2 };
    let mut pool: Vec<u32> = (answer.saturating_sub(5)..=answer + 4)
        .filter(|&candidate| candidate != answer && candidate <= upper)
        .collect();
    pool.shuffle(rng);

    let mut options: Vec<u32> = pool.into_iter().take(OPTION_COUNT - 1).collect();
    options.push(answer);
    options.shuffle(rng);
    options
}

fn render(data: &MathGameData) -> Result<String> {
    let questions = serde_json::to_string(&data.questions).map_err(|e| {
        Error::new(ErrorKind::SerializationFailed, "failed to encode questions")
            .with_operation("math::render")
            .set_source(e)
    })?;
    let title = escape(&data.title);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: 'Comic Sans MS', cursive; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); margin: 0; padding: 20px; min-height: 100vh; display: flex; justify-content: center; align-items: center; }}
        .game-container {{ background: white; border-radius: 20px; padding: 30px; max-width: 600px; width: 100%; }}
        .score-board {{ display: flex; justify-content: space-around; margin-bottom: 20px; }}
        .question {{ font-size: 36px; text-align: center; margin: 20px 0; }}
        .options {{ display: grid; grid-template-columns: repeat(2, 1fr); gap: 15px; }}
        .option-btn {{ padding: 20px; font-size: 24px; border: none; border-radius: 10px; color: white; background: #3498db; cursor: pointer; }}
        .option-btn.correct {{ background: #27ae60; }}
        .option-btn.wrong {{ background: #e74c3c; }}
        .result {{ display: none; text-align: center; }}
        .result.show {{ display: block; }}
    </style>
</head>
<body>
    <div class="game-container">
        <h1>🎯 {title}</h1>
        <div class="score-board">
            <div>✅ 正确: <span id="correct">0</span></div>
            <div>❌ 错误: <span id="wrong">0</span></div>
            <div>📊 进度: <span id="current">1</span>/{count}</div>
            <div id="timer"></div>
        </div>
        <div class="question" id="question"></div>
        <div class="options" id="options"></div>
        <div class="result" id="result">
            <h2>🎉 游戏完成！</h2>
            <p>正确率: <span id="accuracy"></span>%</p>
            <button onclick="resetGame()">再玩一次</button>
        </div>
    </div>
    <script>
        const questions = {questions};
        const timeLimit = {time_limit};
        let index = 0, correct = 0, wrong = 0, remaining = timeLimit, ticker = null;

        function show() {{
            if (index >= questions.length) {{ return finish(); }}
            const q = questions[index];
            document.getElementById('current').textContent = index + 1;
            document.getElementById('question').textContent = q.left + ' ' + q.operator + ' ' + q.right + ' = ?';
            const box = document.getElementById('options');
            box.innerHTML = '';
            q.options.forEach(option => {{
                const btn = document.createElement('button');
                btn.className = 'option-btn';
                btn.textContent = option;
                btn.onclick = () => answer(btn, option === q.answer);
                box.appendChild(btn);
            }});
        }}

        function answer(btn, ok) {{
            btn.classList.add(ok ? 'correct' : 'wrong');
            if (ok) {{ correct++; }} else {{ wrong++; }}
            document.getElementById('correct').textContent = correct;
            document.getElementById('wrong').textContent = wrong;
            index++;
            setTimeout(show, 600);
        }}

        function finish() {{
            clearInterval(ticker);
            document.getElementById('accuracy').textContent = Math.round(correct * 100 / questions.length);
            document.getElementById('result').classList.add('show');
        }}

        function resetGame() {{
            index = 0; correct = 0; wrong = 0; remaining = timeLimit;
            document.getElementById('result').classList.remove('show');
            start();
        }}

        function start() {{
            show();
            if (timeLimit > 0) {{
                clearInterval(ticker);
                ticker = setInterval(() => {{
                    remaining--;
                    document.getElementById('timer').textContent = '⏱ ' + remaining + 's';
                    if (remaining <= 0) {{ index = questions.length; finish(); }}
                }}, 1000);
            }}
        }}

        start();
    </script>
</body>
</html>"#,
        title = title,
        count = data.questions.len(),
        questions = questions,
        time_limit = data.time_limit,
    ))
}

#[async_trait]
impl GameAgent for MathGameAgent {
    fn name(&self) -> &str {
        "数学游戏Agent"
    }

    fn description(&self) -> &str {
        "生成数学类教育游戏，包括加减乘法练习"
    }

    fn priority(&self) -> AgentPriority {
        AgentPriority::High
    }

    async fn execute(&self, context: &mut AgentContext) -> Result<()> {
        tracing::info!(session_id = %context.session_id, title = %context.config.title, "Generating math game");

        let data = self.generate_data(&context.config);
        let html = render(&data)?;
        let game_data = serde_json::to_value(&data).map_err(|e| {
            Error::new(ErrorKind::SerializationFailed, "failed to encode game data")
                .with_operation("math::execute")
                .set_source(e)
        })?;

        context.set_result(GameArtifact::templated("math", html, game_data));
        Ok(())
    }
}
