//! LLM-backed agent that can build any kind of game.
//!
//! Serves the universal category and is the fallback for categories without
//! a dedicated agent. Without a usable backend it renders a static page.

use super::html::{clean_llm_html, escape};
use crate::agent::{AgentPriority, GameAgent};
use crate::config::GameConfig;
use crate::context::{AgentContext, GameArtifact, MODEL_ATTRIBUTE, MODEL_NAME_ATTRIBUTE};
use async_trait::async_trait;
use playforge_error::Result;
use playforge_llm::{ChatMessage, ModelRouter, ProviderError};
use serde_json::json;
use std::fmt::Write;

const SYSTEM_PROMPT: &str = r#"你是一个专业的儿童教育游戏开发专家。请根据用户输入生成一个完整的 HTML5 教育小游戏。

一次完成两步：
- 在内部先细化需求：明确主题、目标、玩法、控制方式、反馈与提示、评分与结束条件、可访问性与响应式规范；
- 然后依据该规范实现最终游戏。不要输出思考过程，只输出最终 HTML。

基本要求：
1) 生成单个、可直接运行的完整 HTML 文件（<!DOCTYPE html>…</html>）。
2) 所有样式与脚本均内联（<style>/<script>），不依赖任何外部资源或 CDN。
3) 界面清晰、适合儿童，同时支持键盘与可点击按钮。
4) 响应式布局，避免固定像素，优先使用百分比、视口单位或 CSS 变量。
5) 分数、进度与提示实时展示；失败原因清晰可见。

交互规范：
- 碰撞检测使用轴对齐矩形相交（AABB），不要硬编码距离阈值。
- 布局限制在游戏根容器内，不要对 <body> 设置全局 flex 或 overflow:hidden。
- 按钮有可读文本或 aria-label，颜色对比度合理。

主题：依据用户输入确定；未指定时选择一个通用且有教育意义的主题，但不要把特定主题写死在代码中。

输出格式：只输出最终完整 HTML，不要包含 Markdown 代码块或解释文字。"#;

#[derive(Debug, Clone, Default)]
pub struct UniversalGameAgent {
    router: Option<ModelRouter>,
}

impl UniversalGameAgent {
    /// An agent without a backend; always renders the static page.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_router(router: ModelRouter) -> Self {
        Self { router: Some(router) }
    }

    pub fn system_prompt() -> &'static str {
        SYSTEM_PROMPT
    }

    pub fn user_prompt(user_input: &str, config: &GameConfig) -> String {
        let mut prompt = String::from("请生成一个游戏，要求如下：\n");
        let _ = writeln!(prompt, "用户需求：{}", user_input);
        let _ = writeln!(prompt, "年龄组：{}", config.age_group);
        let _ = writeln!(prompt, "难度：{}", config.difficulty);
        let _ = writeln!(prompt, "主题：{}", config.theme);
        let _ = writeln!(prompt, "游戏标题：{}", config.title);
        if config.timer_enabled {
            let _ = writeln!(prompt, "计时：开启，游戏时长约 {} 分钟", config.duration_minutes);
        }
        prompt.push_str("\n请确保游戏：\n");
        prompt.push_str("1. 完全符合用户的需求描述\n");
        prompt.push_str("2. 适合指定年龄段的儿童\n");
        prompt.push_str("3. 具有教育意义和趣味性\n");
        prompt.push_str("4. 界面美观，操作简单\n");
        prompt
    }

    fn default_game(context: &mut AgentContext) {
        let title = &context.config.title;
        let html = default_page(title, &context.user_input);
        let game_data = json!({
            "title": title,
            "description": context.user_input,
            "generated": false,
        });
        context.set_result(GameArtifact::templated("universal", html, game_data));
    }
}

fn default_page(title: &str, user_input: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); margin: 0; padding: 20px; min-height: 100vh; }}
        .container {{ background: white; border-radius: 20px; padding: 40px; max-width: 600px; margin: 0 auto; text-align: center; }}
        .game-area {{ background: #f8f9fa; border-radius: 10px; padding: 30px; margin: 20px 0; }}
        button {{ background: #667eea; color: white; border: none; padding: 12px 24px; border-radius: 25px; font-size: 16px; cursor: pointer; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>🎮 {title}</h1>
        <p>您的需求：{request}</p>
        <div class="game-area">
            <p>🚧 游戏正在开发中...</p>
            <p>这是一个基于您需求的游戏模板</p>
            <button onclick="alert('游戏功能开发中！')">开始游戏</button>
        </div>
        <p style="font-size: 14px; color: #999;">提示：配置AI服务后可自动生成完整游戏内容</p>
    </div>
</body>
</html>"#,
        title = escape(title),
        request = escape(user_input),
    )
}

#[async_trait]
impl GameAgent for UniversalGameAgent {
    fn name(&self) -> &str {
        "通用游戏生成Agent"
    }

    fn description(&self) -> &str {
        "使用AI动态生成任意类型的教育游戏"
    }

    fn priority(&self) -> AgentPriority {
        AgentPriority::Low
    }

    async fn execute(&self, context: &mut AgentContext) -> Result<()> {
        let model_key = context.attribute_str(MODEL_ATTRIBUTE).map(str::to_string);

        let provider = self.router.as_ref().and_then(|router| {
            let model_name = router.model_name(model_key.as_deref());
            context.set_attribute(MODEL_NAME_ATTRIBUTE, model_name);
            router.get(model_key.as_deref())
        });

        let Some(provider) = provider else {
            tracing::warn!(session_id = %context.session_id, "No model backend configured, rendering default game");
            Self::default_game(context);
            return Ok(());
        };

        let model_name = context
            .attribute_str(MODEL_NAME_ATTRIBUTE)
            .unwrap_or_else(|| provider.default_model())
            .to_string();
        tracing::info!(
            session_id = %context.session_id,
            model = %model_name,
            "Generating game with LLM"
        );

        let user_prompt = Self::user_prompt(&context.user_input, &context.config);
        tracing::debug!(system = SYSTEM_PROMPT, user = %user_prompt, "Assembled prompt");

        let reply = provider
            .chat(vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)])
            .await
            .map_err(|e: ProviderError| {
                e.into_error()
                    .with_operation("universal::execute")
                    .with_context("model", model_name.clone())
                    .with_context("session_id", context.session_id.clone())
            })?;

        let html = clean_llm_html(&reply);
        let game_data = json!({
            "title": context.config.title,
            "description": context.user_input,
            "generated": true,
        });
        context.set_result(GameArtifact {
            html,
            kind: "universal".to_string(),
            game_data,
            generated_by_llm: true,
            model_name: Some(model_name),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::build_config;
    use crate::intent::IntentAnalyzer;
    use crate::lifecycle::{run_agent, AgentState};
    use playforge_llm::{
        CompletionRequest, CompletionResponse, FinishReason, LlmProvider, ModelRoute, Usage,
    };
    use std::sync::{Arc, Mutex};

    /// Replies with a fixed string and records the prompts it saw.
    struct ScriptedProvider {
        model: &'static str,
        reply: std::result::Result<&'static str, &'static str>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn ok(model: &'static str, reply: &'static str) -> Arc<Self> {
            Arc::new(Self { model, reply: Ok(reply), seen: Mutex::new(Vec::new()) })
        }

        fn failing(model: &'static str) -> Arc<Self> {
            Arc::new(Self { model, reply: Err("upstream 503"), seen: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn default_model(&self) -> &str {
            self.model
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> std::result::Result<CompletionResponse, ProviderError> {
            self.seen.lock().unwrap().push(request);
            match self.reply {
                Ok(reply) => Ok(CompletionResponse {
                    id: "r-1".into(),
                    model: self.model.into(),
                    content: Some(reply.into()),
                    finish_reason: FinishReason::Stop,
                    usage: Usage::default(),
                }),
                Err(message) => Err(ProviderError::Api { status: 503, message: message.into() }),
            }
        }
    }

    fn context(input: &str) -> AgentContext {
        AgentContext::new("s-9", input, build_config(&IntentAnalyzer::new().analyze(input)))
    }

    #[tokio::test]
    async fn test_without_router_renders_default_page() {
        let mut ctx = context("<script>贪吃蛇</script>");
        let state = run_agent(&UniversalGameAgent::new(), &mut ctx).await;

        assert_eq!(state, AgentState::Completed);
        assert!(!ctx.has_attribute(MODEL_NAME_ATTRIBUTE));
        let artifact = ctx.result.unwrap();
        assert!(!artifact.generated_by_llm);
        assert_eq!(artifact.kind, "universal");
        assert_eq!(artifact.game_data["generated"], false);
        assert!(artifact.html.contains("&lt;script&gt;贪吃蛇"));
    }

    #[tokio::test]
    async fn test_empty_router_renders_default_page() {
        let mut ctx = context("贪吃蛇");
        let agent = UniversalGameAgent::with_router(ModelRouter::new());
        let state = run_agent(&agent, &mut ctx).await;

        assert_eq!(state, AgentState::Completed);
        assert_eq!(ctx.attribute_str(MODEL_NAME_ATTRIBUTE), Some("dashscope-default"));
        assert!(!ctx.result.unwrap().generated_by_llm);
    }

    #[tokio::test]
    async fn test_generates_with_selected_model() {
        let default = ScriptedProvider::ok("qwen-plus", "unused");
        let kimi = ScriptedProvider::ok(
            "Moonshot-Kimi-K2-Instruct",
            "```html\n<html><head></head><body>snake</body></html>\n```",
        );
        let router = ModelRouter::new()
            .with_default(default.clone())
            .with_route(ModelRoute::KimiK2, kimi.clone());

        let mut ctx = context("做一个贪吃蛇游戏");
        ctx.set_attribute(MODEL_ATTRIBUTE, "kimi-k2");
        let state = run_agent(&UniversalGameAgent::with_router(router), &mut ctx).await;

        assert_eq!(state, AgentState::Completed);
        assert_eq!(ctx.attribute_str(MODEL_NAME_ATTRIBUTE), Some("Moonshot-Kimi-K2-Instruct"));

        let artifact = ctx.result.unwrap();
        assert!(artifact.generated_by_llm);
        assert_eq!(artifact.model_name.as_deref(), Some("Moonshot-Kimi-K2-Instruct"));
        assert!(artifact.html.contains("<meta charset=\"UTF-8\">"));
        assert!(artifact.html.contains("snake"));
        assert!(!artifact.html.contains("```"));

        assert!(default.seen.lock().unwrap().is_empty());
        let seen = kimi.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].messages[0].content, SYSTEM_PROMPT);
        assert!(seen[0].messages[1].content.contains("用户需求：做一个贪吃蛇游戏"));
    }

    #[tokio::test]
    async fn test_provider_failure_fails_the_run() {
        let router = ModelRouter::new().with_default(ScriptedProvider::failing("qwen-plus"));
        let mut ctx = context("做一个贪吃蛇游戏");
        let state = run_agent(&UniversalGameAgent::with_router(router), &mut ctx).await;

        assert_eq!(state, AgentState::Failed);
        assert!(!ctx.success);
        assert!(ctx.error.unwrap().contains("upstream 503"));
    }

    #[test]
    fn test_user_prompt_includes_config() {
        let config = build_config(&IntentAnalyzer::new().analyze("7岁 太空 计时 15分钟"));
        let prompt = UniversalGameAgent::user_prompt("太空探险", &config);
        assert!(prompt.contains("用户需求：太空探险"));
        assert!(prompt.contains("年龄组：6-8"));
        assert!(prompt.contains("主题：space"));
        assert!(prompt.contains("15 分钟"));
    }
}
