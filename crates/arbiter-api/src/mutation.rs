//! Admin writes packaged as step-up gated actions.

use arbiter_core::{MutationKind, SensitiveAction, SensitiveToken};
use arbiter_stepup::GuardedAction;
use async_trait::async_trait;

use crate::error::ApiError;
use crate::resources::{AdminResource, Payload, RecordId, ResourceClient, check_id};

/// One pending write against an admin collection.
pub enum Change<P> {
    /// Create a record from the form.
    Create(P),
    /// Replace record `id` with the form.
    Update(RecordId, P),
    /// Delete record `id`.
    Delete(RecordId),
}

/// A write ready to run through [`arbiter_stepup::perform`].
///
/// ```rust,no_run
/// # use arbiter_api::{AdminClient, ResourceMutation, RolePayload};
/// # use arbiter_stepup::{SensitiveActionController, perform};
/// # async fn demo(client: AdminClient, controller: SensitiveActionController) {
/// let change = ResourceMutation::create(client.roles(), RolePayload::new("judge"));
/// let outcome = perform(&controller, change).await;
/// # }
/// ```
pub struct ResourceMutation<R: AdminResource> {
    api: ResourceClient<R>,
    change: Change<R::Payload>,
}

impl<R: AdminResource> ResourceMutation<R> {
    /// Create a record.
    #[must_use]
    pub fn create(api: ResourceClient<R>, payload: R::Payload) -> Self {
        Self {
            api,
            change: Change::Create(payload),
        }
    }

    /// Update record `id`.
    #[must_use]
    pub fn update(api: ResourceClient<R>, id: RecordId, payload: R::Payload) -> Self {
        Self {
            api,
            change: Change::Update(id, payload),
        }
    }

    /// Delete record `id`.
    #[must_use]
    pub fn delete(api: ResourceClient<R>, id: RecordId) -> Self {
        Self {
            api,
            change: Change::Delete(id),
        }
    }
}

impl<R: AdminResource> std::fmt::Debug for ResourceMutation<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceMutation")
            .field("action", &self.action())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<R: AdminResource> GuardedAction for ResourceMutation<R> {
    /// The stored record, when the backend echoes it. Always `None` for deletes.
    type Output = Option<R>;
    type Error = ApiError;

    fn action(&self) -> SensitiveAction {
        let mutation = match self.change {
            Change::Create(_) => MutationKind::Create,
            Change::Update(..) => MutationKind::Update,
            Change::Delete(_) => MutationKind::Delete,
        };
        SensitiveAction::new(R::KIND, mutation)
    }

    fn validate(&self) -> Result<(), ApiError> {
        match self.change {
            Change::Create(ref payload) => payload.validate()?,
            Change::Update(id, ref payload) => {
                check_id(id)?;
                payload.validate()?;
            },
            Change::Delete(id) => check_id(id)?,
        }
        Ok(())
    }

    async fn execute(self, token: SensitiveToken) -> Result<Option<R>, ApiError> {
        match self.change {
            Change::Create(payload) => self.api.create(&payload, token).await,
            Change::Update(id, payload) => self.api.update(id, &payload, token).await,
            Change::Delete(id) => self.api.delete(id, token).await.map(|()| None),
        }
    }
}
