//! Shared fixtures for unit tests across the crate

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::coordination::{
    AuthHooks, HookError, PostLoginContext, PostRegistrationContext, PreLoginContext,
    PreRegistrationContext,
};
use crate::identity::{MemoryIdentityClient, NewAccount};

pub(crate) const TEST_APPLICATION: &str = "memory://application";

pub(crate) fn alice() -> NewAccount {
    NewAccount {
        email: "alice@example.com".to_string(),
        password: "correct horse".to_string(),
        given_name: "Alice".to_string(),
        surname: "Liddell".to_string(),
        ..Default::default()
    }
}

/// Memory client with `alice@example.com` / `correct horse` already enabled.
pub(crate) async fn memory_client() -> MemoryIdentityClient {
    let client = MemoryIdentityClient::new(TEST_APPLICATION);
    client
        .seed_account(alice())
        .await
        .expect("seeding alice should succeed");
    client
}

/// Hooks that record the order they were called in and can be told to fail at one step.
#[derive(Default)]
pub(crate) struct RecordingHooks {
    calls: Mutex<Vec<&'static str>>,
    fail_at: Option<&'static str>,
}

impl RecordingHooks {
    pub(crate) fn failing(step: &'static str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_at: Some(step),
        }
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("hook log poisoned").clone()
    }

    fn record(&self, step: &'static str) -> Result<(), HookError> {
        self.calls.lock().expect("hook log poisoned").push(step);
        if self.fail_at == Some(step) {
            return Err(HookError::Rejected(format!("{step} refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl AuthHooks for RecordingHooks {
    async fn pre_login(&self, _context: &mut PreLoginContext) -> Result<(), HookError> {
        self.record("pre_login")
    }

    async fn post_login(&self, _context: &PostLoginContext) -> Result<(), HookError> {
        self.record("post_login")
    }

    async fn pre_registration(
        &self,
        context: &mut PreRegistrationContext,
    ) -> Result<(), HookError> {
        context
            .account
            .custom_data
            .insert("source".to_string(), Value::String("hook".to_string()));
        self.record("pre_registration")
    }

    async fn post_registration(&self, _context: &PostRegistrationContext) -> Result<(), HookError> {
        self.record("post_registration")
    }
}
