//! Card-flip memory game agent.

use super::html::escape;
use crate::agent::GameAgent;
use crate::config::DifficultyLevel;
use crate::context::{AgentContext, GameArtifact};
use async_trait::async_trait;
use playforge_error::{Error, ErrorKind, Result};
use serde_json::json;

pub fn pair_count(difficulty: DifficultyLevel) -> usize {
    match difficulty {
        DifficultyLevel::Easy => 6,
        DifficultyLevel::Medium => 8,
        DifficultyLevel::Hard | DifficultyLevel::Adaptive => 10,
    }
}

pub fn theme_icons(theme: &str) -> &'static [&'static str] {
    match theme.to_ascii_lowercase().as_str() {
        "animals" => &["🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯"],
        "space" => &["🚀", "🛸", "🌟", "⭐", "🌙", "☄️", "🌍", "🪐", "👽", "🛰️"],
        "ocean" => &["🐠", "🐟", "🐡", "🦈", "🐙", "🦀", "🦞", "🦐", "🐚", "🐳"],
        "dinosaur" => &["🦕", "🦖", "🦴", "🥚", "🌋", "🌿", "🌳", "🪨", "🔥", "☄️"],
        "superhero" => &["🦸", "🦹", "⚡", "🛡️", "⚔️", "🎯", "💪", "🔥", "❄️", "🌟"],
        _ => &["😀", "😃", "😄", "😁", "😆", "😅", "🤣", "😂", "🙂", "😊"],
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryGameAgent;

impl MemoryGameAgent {
    pub fn new() -> Self {
        Self
    }
}

fn render(title: &str, icons: &[&str], timer_enabled: bool) -> Result<String> {
    let icons_json = serde_json::to_string(icons).map_err(|e| {
        Error::new(ErrorKind::SerializationFailed, "failed to encode card icons")
            .with_operation("memory::render")
            .set_source(e)
    })?;
    let title = escape(title);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; background: linear-gradient(135deg, #f6d365 0%, #fda085 100%); margin: 0; padding: 20px; min-height: 100vh; }}
        .stats {{ display: flex; justify-content: center; gap: 30px; font-size: 20px; margin-bottom: 20px; }}
        .board {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(80px, 1fr)); gap: 12px; max-width: 600px; margin: 0 auto; }}
        .card {{ aspect-ratio: 1; border-radius: 10px; background: #6c5ce7; color: transparent; font-size: 40px; display: flex; align-items: center; justify-content: center; cursor: pointer; }}
        .card.flipped, .card.matched {{ background: white; color: inherit; }}
        .card.matched {{ opacity: 0.6; cursor: default; }}
    </style>
</head>
<body>
    <h1 style="text-align: center">🧠 {title}</h1>
    <div class="stats">
        <div class="stat">步数: <span id="moves">0</span></div>
        <div class="stat">配对: <span id="pairs">0</span>/{pairs}</div>
        <div class="stat" id="timer"></div>
    </div>
    <div class="board" id="board"></div>
    <p style="text-align: center"><button onclick="resetGame()">重新开始</button></p>
    <script>
        const icons = {icons_json};
        const timerEnabled = {timer_enabled};
        let first = null, lock = false, moves = 0, matchedPairs = 0, seconds = 0, ticker = null;

        function shuffle(list) {{
            for (let i = list.length - 1; i > 0; i--) {{
                const j = Math.floor(Math.random() * (i + 1));
                [list[i], list[j]] = [list[j], list[i]];
            }}
            return list;
        }}

        function flip(card) {{
            if (lock || card === first || card.classList.contains('matched')) {{ return; }}
            card.classList.add('flipped');
            if (!first) {{ first = card; return; }}
            moves++;
            document.getElementById('moves').textContent = moves;
            if (first.dataset.icon === card.dataset.icon) {{
                first.classList.add('matched');
                card.classList.add('matched');
                first = null;
                matchedPairs++;
                document.getElementById('pairs').textContent = matchedPairs;
                if (matchedPairs === icons.length) {{
                    clearInterval(ticker);
                    setTimeout(() => alert('🎉 全部配对成功！用了 ' + moves + ' 步'), 300);
                }}
            }} else {{
                lock = true;
                setTimeout(() => {{
                    first.classList.remove('flipped');
                    card.classList.remove('flipped');
                    first = null;
                    lock = false;
                }}, 800);
            }}
        }}

        function resetGame() {{
            const board = document.getElementById('board');
            board.innerHTML = '';
            first = null; lock = false; moves = 0; matchedPairs = 0; seconds = 0;
            document.getElementById('moves').textContent = '0';
            document.getElementById('pairs').textContent = '0';
            shuffle([...icons, ...icons]).forEach(icon => {{
                const card = document.createElement('div');
                card.className = 'card';
                card.dataset.icon = icon;
                card.textContent = icon;
                card.onclick = () => flip(card);
                board.appendChild(card);
            }});
            clearInterval(ticker);
            if (timerEnabled) {{
                ticker = setInterval(() => {{
                    seconds++;
                    document.getElementById('timer').textContent = '⏱ ' + seconds + 's';
                }}, 1000);
            }}
        }}

        resetGame();
    </script>
</body>
</html>"#,
        pairs = icons.len(),
    ))
}

#[async_trait]
impl GameAgent for MemoryGameAgent {
    fn name(&self) -> &str {
        "记忆游戏Agent"
    }

    fn description(&self) -> &str {
        "生成记忆翻牌配对游戏，锻炼儿童记忆力"
    }

    async fn execute(&self, context: &mut AgentContext) -> Result<()> {
        let config = &context.config;
        tracing::info!(session_id = %context.session_id, title = %config.title, "Generating memory game");

        let icons = theme_icons(&config.theme);
        let icons = &icons[..pair_count(config.difficulty).min(icons.len())];
        let html = render(&config.title, icons, config.timer_enabled)?;
        let game_data = json!({
            "title": config.title,
            "theme": config.theme,
            "difficulty": config.difficulty,
            "pairs": icons.len(),
        });

        context.set_result(GameArtifact::templated("memory", html, game_data));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::build_config;
    use crate::intent::IntentAnalyzer;
    use crate::lifecycle::{run_agent, AgentState};

    #[test]
    fn test_pair_count() {
        assert_eq!(pair_count(DifficultyLevel::Easy), 6);
        assert_eq!(pair_count(DifficultyLevel::Medium), 8);
        assert_eq!(pair_count(DifficultyLevel::Hard), 10);
        assert_eq!(pair_count(DifficultyLevel::Adaptive), 10);
    }

    #[test]
    fn test_theme_icons() {
        assert_eq!(theme_icons("ocean")[0], "🐠");
        assert_eq!(theme_icons("Space")[0], "🚀");
        assert_eq!(theme_icons("adventure")[0], "😀");
        for theme in ["animals", "space", "ocean", "dinosaur", "superhero", "fairy-tale"] {
            assert!(theme_icons(theme).len() >= 10);
        }
    }

    #[tokio::test]
    async fn test_execute_renders_pairs() {
        let config = build_config(&IntentAnalyzer::new().analyze("中等难度的海洋记忆游戏"));
        let mut ctx = AgentContext::new("s-1", "海洋记忆", config);

        let state = run_agent(&MemoryGameAgent::new(), &mut ctx).await;

        assert_eq!(state, AgentState::Completed);
        let artifact = ctx.result.unwrap();
        assert_eq!(artifact.kind, "memory");
        assert_eq!(artifact.game_data["pairs"], 8);
        assert_eq!(artifact.game_data["theme"], "ocean");
        assert_eq!(artifact.game_data["difficulty"], "medium");
        assert!(artifact.html.contains("/8</div>"));
        assert!(artifact.html.contains("🐠"));
    }
}
