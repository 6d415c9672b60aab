use super::offline_queue::PodQueue;
use crate::application::ports::DeliveryApi;
use crate::domain::entities::ProofOfDelivery;
use crate::shared::error::AppError;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// The upload could not reach the backend; kept in the offline queue
    /// under this id.
    Queued(i64),
}

pub struct PodService {
    api: Arc<dyn DeliveryApi>,
    queue: Arc<PodQueue>,
}

impl PodService {
    pub fn new(api: Arc<dyn DeliveryApi>, queue: Arc<PodQueue>) -> Self {
        Self { api, queue }
    }

    pub fn queue(&self) -> &PodQueue {
        &self.queue
    }

    pub async fn submit(&self, pod: &ProofOfDelivery) -> Result<SubmitOutcome, AppError> {
        pod.validate()?;

        match self.api.submit_pod(pod).await {
            Ok(()) => {
                info!(
                    "Submitted POD for stop {} ({} photos)",
                    pod.stop_id,
                    pod.photos.len()
                );
                Ok(SubmitOutcome::Submitted)
            }
            Err(e) if e.is_transport() => {
                warn!("POD upload for stop {} failed, queueing: {e}", pod.stop_id);
                let id = self.queue.queue(pod).await?;
                Ok(SubmitOutcome::Queued(id))
            }
            Err(e) => Err(e),
        }
    }
}
