// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `hive msg send|outbox` (spec.md §6): direct session-to-session messaging
//! between agents, bypassing the story/PR/escalation pipeline entirely — a
//! Tech Lead nudging a worker, or a worker asking a teammate a quick
//! question. There is no persisted message queue (spec.md's data model has
//! none); `outbox` reads back the tail of the sending session's own pane,
//! which is the closest thing to "what have I sent" a terminal-multiplexer
//! session has.

use hive_core::Effect;
use hive_engine::execute;

use crate::context;
use crate::exit_error::ExitError;

const DEFAULT_OUTBOX_LINES: usize = 60;

/// `hive msg send <to-session> -m "<text>"`.
pub async fn send(to_session: String, message: String) -> Result<(), ExitError> {
    let ctx = context::open()?;

    {
        let state = ctx.store.read();
        if !state.agents.values().any(|a| a.session_name.as_deref() == Some(to_session.as_str())) {
            return Err(ExitError::user(format!("no agent with session {to_session}")));
        }
    }

    execute(&ctx.effects, &Effect::SendSessionMessageWithConfirmation { session_name: to_session.clone(), text: message })
        .await
        .map_err(ExitError::from)?;

    println!("{} {to_session}", crate::color::header("Sent to"));
    Ok(())
}

/// `hive msg outbox [session] [--lines N]` — tail the sender's own pane.
pub async fn outbox(session: Option<String>, lines: usize) -> Result<(), ExitError> {
    let ctx = context::open()?;
    let agent_id = context::agent_for_session(&ctx, &session)?;
    let session_name = ctx
        .store
        .read()
        .get_agent(agent_id.as_str())
        .and_then(|a| a.session_name.clone())
        .ok_or_else(|| ExitError::internal("agent has no session"))?;

    let result = execute(&ctx.effects, &Effect::CapturePane { session_name, lines: if lines == 0 { DEFAULT_OUTBOX_LINES } else { lines } })
        .await
        .map_err(ExitError::from)?;

    println!("{}", result.captured_pane.unwrap_or_default());
    Ok(())
}
