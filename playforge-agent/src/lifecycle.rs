//! The uniform execution contract every agent run goes through.
//!
//! `Created -> Running -> Completed | Failed`. Errors and panics raised by the
//! agent are recorded on the context and never escape [`run_agent`].

use crate::agent::GameAgent;
use crate::context::AgentContext;
use futures_util::FutureExt;
use playforge_error::Error;
use std::any::Any;
use std::panic::AssertUnwindSafe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Created,
    Running,
    Completed,
    Failed,
}

impl AgentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentState::Completed | AgentState::Failed)
    }
}

/// Run `agent` against `context` and return the terminal state.
///
/// On failure `context.success` is false and `context.error` holds a
/// non-empty message.
pub async fn run_agent(agent: &dyn GameAgent, context: &mut AgentContext) -> AgentState {
    context.mark_started();
    context.state = AgentState::Running;
    tracing::info!(
        session_id = %context.session_id,
        agent = agent.name(),
        "Agent started"
    );

    let outcome = AssertUnwindSafe(agent.execute(context)).catch_unwind().await;

    let failure = match outcome {
        Ok(Ok(())) => check_outcome(agent, context),
        Ok(Err(err)) => Some(err),
        Err(payload) => Some(Error::handler_panicked(agent.name(), panic_message(payload.as_ref()))),
    };

    let elapsed_ms = context.elapsed_ms();
    match failure {
        None => {
            context.state = AgentState::Completed;
            tracing::info!(
                session_id = %context.session_id,
                agent = agent.name(),
                elapsed_ms,
                "Agent completed"
            );
        }
        Some(err) => {
            tracing::error!(
                session_id = %context.session_id,
                agent = agent.name(),
                elapsed_ms,
                error = %err,
                "Agent failed"
            );
            let message = if err.message().is_empty() {
                err.to_string()
            } else {
                err.message().to_string()
            };
            context.fail(message);
            context.state = AgentState::Failed;
        }
    }
    context.state
}

/// Validate what an agent left behind after returning `Ok`.
fn check_outcome(agent: &dyn GameAgent, context: &AgentContext) -> Option<Error> {
    if !context.success {
        let reported = context.error.as_deref().map(str::trim).unwrap_or_default();
        let message = if reported.is_empty() {
            format!("agent '{}' reported failure without a message", agent.name())
        } else {
            reported.to_string()
        };
        return Some(Error::handler_failed(agent.name(), message));
    }

    if context.result.is_none() {
        return Some(Error::handler_failed(
            agent.name(),
            format!("agent '{}' completed without producing a result", agent.name()),
        ));
    }

    None
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::build_config;
    use crate::context::GameArtifact;
    use crate::intent::IntentAnalyzer;
    use async_trait::async_trait;
    use playforge_error::Result;

    enum Behavior {
        Succeed,
        Fail,
        Panic,
        NoResult,
        SelfReported(Option<&'static str>),
    }

    struct Scripted(Behavior);

    #[async_trait]
    impl GameAgent for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn description(&self) -> &str {
            "behaves as told"
        }

        async fn execute(&self, context: &mut AgentContext) -> Result<()> {
            match &self.0 {
                Behavior::Succeed => {
                    context.set_result(GameArtifact::templated(
                        "test",
                        "<html></html>".into(),
                        serde_json::Value::Null,
                    ));
                    Ok(())
                }
                Behavior::Fail => Err(Error::inference_failed("backend unreachable")),
                Behavior::Panic => panic!("template index out of range"),
                Behavior::NoResult => Ok(()),
                Behavior::SelfReported(message) => {
                    context.success = false;
                    context.error = message.map(str::to_string);
                    Ok(())
                }
            }
        }
    }

    fn context() -> AgentContext {
        AgentContext::new("s-1", "数学", build_config(&IntentAnalyzer::new().analyze("数学")))
    }

    async fn run(behavior: Behavior) -> (AgentState, AgentContext) {
        let mut ctx = context();
        let state = run_agent(&Scripted(behavior), &mut ctx).await;
        (state, ctx)
    }

    #[tokio::test]
    async fn test_success_completes() {
        let (state, ctx) = run(Behavior::Succeed).await;
        assert_eq!(state, AgentState::Completed);
        assert_eq!(ctx.state, AgentState::Completed);
        assert!(ctx.success);
        assert!(ctx.result.is_some());
        assert!(ctx.error.is_none());
        assert!(ctx.started_at.is_some());
    }

    #[tokio::test]
    async fn test_error_is_captured() {
        let (state, ctx) = run(Behavior::Fail).await;
        assert_eq!(state, AgentState::Failed);
        assert!(!ctx.success);
        assert_eq!(ctx.error.as_deref(), Some("backend unreachable"));
    }

    #[tokio::test]
    async fn test_panic_is_captured() {
        let (state, ctx) = run(Behavior::Panic).await;
        assert_eq!(state, AgentState::Failed);
        assert!(!ctx.success);
        let error = ctx.error.unwrap();
        assert!(error.contains("panicked"));
        assert!(error.contains("template index out of range"));
    }

    #[tokio::test]
    async fn test_missing_result_is_a_failure() {
        let (state, ctx) = run(Behavior::NoResult).await;
        assert_eq!(state, AgentState::Failed);
        assert!(ctx.error.unwrap().contains("without producing a result"));
    }

    #[tokio::test]
    async fn test_self_reported_failure_keeps_message() {
        let (state, ctx) = run(Behavior::SelfReported(Some("bad config"))).await;
        assert_eq!(state, AgentState::Failed);
        assert_eq!(ctx.error.as_deref(), Some("bad config"));
    }

    #[tokio::test]
    async fn test_self_reported_failure_gets_generic_message() {
        let (state, ctx) = run(Behavior::SelfReported(None)).await;
        assert_eq!(state, AgentState::Failed);
        assert!(ctx.error.unwrap().contains("reported failure"));
    }

    #[test]
    fn test_terminal_states() {
        assert!(AgentState::Completed.is_terminal());
        assert!(AgentState::Failed.is_terminal());
        assert!(!AgentState::Running.is_terminal());
    }
}
