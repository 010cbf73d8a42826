//! The session orchestrator.
//!
//! Composes the store and the three backend drivers to drive the
//! Starting -> Active -> Stopping -> {Stopped, Teardown} lifecycle, start
//! steps against allocated services and reconcile persisted status with
//! what the backends report.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use stagehand_config::OrchestratorConfig;
use stagehand_protocols::entity::{ActivityRecord, ObjectType, Service, Session, Step};
use stagehand_protocols::ephemeral::{DirectiveAction, EphemeralServiceDriver};
use stagehand_protocols::error::OrchestratorError;
use stagehand_protocols::job::{JobManagerDriver, SubmitRequest};
use stagehand_protocols::resource::ResourceManagerDriver;
use stagehand_protocols::status::{Activity, ServiceStatus, SessionStatus, StepStatus};
use stagehand_protocols::workflow::{Flavor, Location, ServiceKind, ServiceSpec, WorkflowDescription};
use stagehand_store::{
    Predicate, ServiceField, SessionField, StepDescriptionField, StepField, Store,
};

use crate::registry::DriverSet;
use crate::template::{substitute, unresolved_variables, validate_session_name};
use crate::views::{ServiceView, SessionView, StepView};

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;

/// Everything needed to start a session.
#[derive(Debug, Clone)]
pub struct StartSessionRequest {
    pub session_name: String,
    pub user_name: String,
    pub workflow: WorkflowDescription,
    pub replacements: HashMap<String, String>,
    pub synchronous: bool,
}

/// The core state machine.
pub struct Orchestrator {
    store: Arc<Store>,
    drivers: DriverSet,
    pacing: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(store: Arc<Store>, drivers: DriverSet, pacing: OrchestratorConfig) -> Self {
        Self {
            store,
            drivers,
            pacing,
        }
    }

    // ---- session lifecycle ----

    /// Start a session: validate the workflow, reserve and launch its
    /// services, persist the step descriptions.
    ///
    /// A reservation or submission failure on one service does not roll
    /// back siblings already reserved; the session stays `Starting` with
    /// partial services, which an operator can stop and retry.
    pub async fn start_session(
        &self,
        request: StartSessionRequest,
    ) -> Result<Session, OrchestratorError> {
        let name = &request.session_name;
        tracing::info!(session = %name, sync = request.synchronous, "starting session");

        if let Some(reason) = validate_session_name(name) {
            return Err(OrchestratorError::BadRequest(format!(
                "session name ({name}) {reason}"
            )));
        }
        if request.replacements.contains_key("SESSION") {
            return Err(OrchestratorError::BadRequest(
                "predefined variables must not be redefined".to_string(),
            ));
        }

        let mut vars = request.replacements.clone();
        vars.insert("SESSION".to_string(), name.clone());
        let workflow = resolve_workflow(&request.workflow, &vars)?;

        self.validate_workflow(&workflow)?;

        // The name only has to be free among non-terminal sessions.
        let same_name = self
            .store
            .find_sessions(Predicate::any().eq(SessionField::Name, name.as_str()))
            .await?;
        if same_name.iter().any(|s| !s.status.is_terminal()) {
            return Err(OrchestratorError::Conflict(format!(
                "session {name} (workflow {}) is already started",
                workflow.name
            )));
        }

        let session = self
            .store
            .add_session(name, &workflow.name, &request.user_name, SessionStatus::Starting)
            .await?;
        self.store
            .log_activity(ObjectType::Session, session.id, Activity::Creation)
            .await?;

        // Launch every declared service, collecting failures instead of
        // rolling back what already succeeded.
        let mut failures: Vec<String> = Vec::new();
        let mut service_ids: HashMap<String, i64> = HashMap::new();
        for spec in &workflow.services {
            match self.launch_service(&session, spec, &request.user_name).await? {
                Ok(id) => {
                    service_ids.insert(spec.name.clone(), id);
                }
                Err(reason) => failures.push(reason),
            }
        }

        for step in &workflow.steps {
            let service_id = step
                .service
                .as_ref()
                .and_then(|s| service_ids.get(s))
                .copied();
            let description = self
                .store
                .add_step_description(session.id, &step.name, &step.command, service_id)
                .await?;
            self.store
                .log_activity(ObjectType::StepDescription, description.id, Activity::Creation)
                .await?;
        }

        if !failures.is_empty() {
            return Err(OrchestratorError::Upstream(format!(
                "session {name} left partially started: {}",
                failures.join("; ")
            )));
        }

        if request.synchronous {
            return self.wait_until(&session, SessionStatus::Active).await;
        }
        Ok(session)
    }

    /// Stop a session: require its steps to be finished (or cancel them
    /// with `force`), release its services and soft-stop the rows.
    ///
    /// Child rows are retained for audit; only statuses move.
    pub async fn stop_session(
        &self,
        name: &str,
        synchronous: bool,
        force: bool,
    ) -> Result<(), OrchestratorError> {
        let session = self.require_session(name).await?;
        tracing::info!(session = %name, sync = synchronous, force, "stopping session");

        if matches!(session.status, SessionStatus::Stopped | SessionStatus::Stopping) && !force {
            return Err(OrchestratorError::Conflict(format!(
                "session {name} is already {}",
                session.status
            )));
        }

        // Stopping blocks new steps from other requests while we work.
        self.store
            .update_session_status(session.id, SessionStatus::Stopping)
            .await?;

        let steps_not_stopped = self.settle_steps(&session, force).await?;
        if steps_not_stopped > 0 && !force {
            // Keep the session stoppable, but refuse to pull storage out
            // from under running jobs.
            self.store
                .update_session_status(session.id, SessionStatus::Teardown)
                .await?;
            return Err(OrchestratorError::Conflict(format!(
                "session {name} has {steps_not_stopped} steps not yet completed"
            )));
        }

        let (pending, failures) = self.release_services(&session).await?;
        if !failures.is_empty() {
            self.store
                .update_session_status(session.id, SessionStatus::Teardown)
                .await?;
            return Err(OrchestratorError::Upstream(format!(
                "session {name} could not release every service: {}",
                failures.join("; ")
            )));
        }

        if synchronous {
            self.wait_until(&session, SessionStatus::Stopped).await?;
            return Ok(());
        }
        if pending == 0 {
            self.finalize_session(&session).await?;
        }
        Ok(())
    }

    /// Start one step instance: resolve its template, submit the job with
    /// the owning service's directives and persist the new step row.
    pub async fn start_step(
        &self,
        session_name: &str,
        step_name: &str,
        replacements: &HashMap<String, String>,
    ) -> Result<Step, OrchestratorError> {
        let session = self.require_session(session_name).await?;
        let (session, _) = self.reconcile_session(session).await?;
        tracing::info!(session = %session_name, step = %step_name, "starting step");

        if session.status != SessionStatus::Active {
            return Err(OrchestratorError::Conflict(format!(
                "session {session_name} not started yet"
            )));
        }
        let services = self
            .store
            .find_services(Predicate::any().eq(ServiceField::SessionId, session.id))
            .await?;
        if services.iter().any(|s| !s.status.is_allocated()) {
            return Err(OrchestratorError::Conflict(format!(
                "some services are not allocated for session {session_name}"
            )));
        }

        let description = self
            .store
            .find_step_description(
                Predicate::any()
                    .eq(StepDescriptionField::SessionId, session.id)
                    .eq(StepDescriptionField::Name, step_name),
            )
            .await?
            .ok_or_else(|| {
                OrchestratorError::NotFound(format!(
                    "step {step_name} not stored for session {session_name}"
                ))
            })?;

        if replacements.contains_key("STEP") || replacements.contains_key("SESSION") {
            return Err(OrchestratorError::BadRequest(
                "predefined variables must not be redefined".to_string(),
            ));
        }
        let mut vars = replacements.clone();
        vars.insert("STEP".to_string(), step_name.to_string());
        vars.insert("SESSION".to_string(), session.name.clone());
        let command = substitute(&description.command, &vars);
        if let Some(variable) = unresolved_variables(&command).into_iter().next() {
            return Err(OrchestratorError::BadRequest(format!(
                "step command contains undefined variable '{variable}' in \"{}\"",
                description.command
            )));
        }

        // Each invocation gets its own row and its own instance name;
        // concurrent instances of the same description are expected.
        let index = self
            .store
            .find_steps(Predicate::any().eq(StepField::StepDescriptionId, description.id))
            .await?
            .len()
            + 1;
        let instance_name = format!("{}-{}-{step_name}_{index}", session.user_name, session.name);

        let step = self
            .store
            .add_step(description.id, &instance_name, StepStatus::Starting.as_str(), &command)
            .await?;
        self.store
            .log_activity(ObjectType::Step, step.id, Activity::Creation)
            .await?;

        let mut submit = SubmitRequest {
            job_name: step_name.to_string(),
            directives: None,
            command,
            partition: None,
            dependency: None,
        };
        if let Some(service_id) = description.service_id {
            let service = self
                .store
                .find_service(Predicate::any().eq(ServiceField::Id, service_id))
                .await?
                .ok_or_else(|| {
                    OrchestratorError::NotFound(format!(
                        "step {step_name} uses a service that is not stored"
                    ))
                })?;
            if service.kind != ServiceKind::None {
                let driver = self.ephemeral_driver(service.kind)?;
                submit.directives = Some(driver.job_directives(&service, DirectiveAction::Use));
            }
            if !service.location.is_empty() {
                submit.partition = Some(service.location.clone());
            }
            submit.dependency = service.jobid;
        }

        let jobid = match self.drivers.jobs().submit(submit).await {
            Ok(jobid) => jobid,
            Err(e) => {
                // The row was provisional; without a job it never ran.
                self.store.delete_step(step.id).await?;
                return Err(OrchestratorError::Upstream(format!(
                    "failed to run step {step_name}: {e}"
                )));
            }
        };
        self.store.assign_step_jobid(step.id, jobid).await?;

        Ok(Step {
            jobid: Some(jobid),
            ..step
        })
    }

    // ---- read operations ----

    pub async fn get_session(&self, name: &str) -> Result<SessionView, OrchestratorError> {
        let session = self.require_session(name).await?;
        let (session, stale) = self.reconcile_session(session).await?;
        Ok(SessionView { session, stale })
    }

    pub async fn list_sessions(&self) -> Result<Vec<SessionView>, OrchestratorError> {
        let sessions = self.store.find_sessions(Predicate::any()).await?;
        let mut views = Vec::with_capacity(sessions.len());
        for session in sessions {
            let (session, stale) = self.reconcile_session(session).await?;
            views.push(SessionView { session, stale });
        }
        Ok(views)
    }

    pub async fn session_services(&self, name: &str) -> Result<Vec<ServiceView>, OrchestratorError> {
        let session = self.require_session(name).await?;
        let services = self
            .store
            .find_services(Predicate::any().eq(ServiceField::SessionId, session.id))
            .await?;
        let mut views = Vec::with_capacity(services.len());
        for service in services {
            let (service, stale) = self.reconcile_service(service).await?;
            views.push(ServiceView { service, stale });
        }
        Ok(views)
    }

    /// All step instances of one step description, statuses reconciled and
    /// combined for output.
    pub async fn get_steps(
        &self,
        session_name: &str,
        step_name: &str,
    ) -> Result<Vec<StepView>, OrchestratorError> {
        let session = self.require_session(session_name).await?;
        let description = self
            .store
            .find_step_description(
                Predicate::any()
                    .eq(StepDescriptionField::SessionId, session.id)
                    .eq(StepDescriptionField::Name, step_name),
            )
            .await?
            .ok_or_else(|| {
                OrchestratorError::NotFound(format!(
                    "step {step_name} not stored for session {session_name}"
                ))
            })?;
        self.step_views_of(description.id).await
    }

    /// All step instances of a session.
    pub async fn list_steps(&self, session_name: &str) -> Result<Vec<StepView>, OrchestratorError> {
        let session = self.require_session(session_name).await?;
        let descriptions = self
            .store
            .find_step_descriptions(Predicate::any().eq(StepDescriptionField::SessionId, session.id))
            .await?;
        let mut views = Vec::new();
        for description in descriptions {
            views.extend(self.step_views_of(description.id).await?);
        }
        Ok(views)
    }

    /// Record progress reported by the job identified by `jobid`; returns
    /// the step instance name.
    pub async fn update_step_progress(
        &self,
        jobid: i64,
        progress: &str,
    ) -> Result<String, OrchestratorError> {
        let step = self
            .store
            .find_step(Predicate::any().eq(StepField::Jobid, jobid))
            .await?
            .ok_or_else(|| {
                OrchestratorError::NotFound(format!("there is no active step for jobid {jobid}"))
            })?;
        self.store.update_step_progress(step.id, progress).await?;
        Ok(step.instance_name)
    }

    /// Locations usable for service placement: the resource manager's
    /// answer when one is deployed, the scheduler's partitions otherwise.
    pub async fn usable_locations(&self) -> Vec<Location> {
        if self.drivers.has_resource_manager() {
            self.drivers.resources().usable_locations().await
        } else {
            self.drivers.jobs().get_usable_locations().await
        }
    }

    pub async fn usable_flavors(&self) -> Vec<Flavor> {
        self.drivers.resources().usable_flavors().await
    }

    pub async fn activity_log(&self) -> Result<Vec<ActivityRecord>, OrchestratorError> {
        Ok(self.store.activities().await?)
    }

    // ---- reconciliation ----

    /// Re-query the backend for one service and write back any change.
    ///
    /// An `Unknown` answer (backend unreachable) never overwrites stored
    /// state; the last-known value is returned marked stale.
    async fn reconcile_service(
        &self,
        service: Service,
    ) -> Result<(Service, bool), OrchestratorError> {
        let driver = self.ephemeral_driver(service.kind)?;
        let Some(observed) = driver.query_status(&service.name).await else {
            return Ok((service, false));
        };
        if observed == ServiceStatus::Unknown {
            tracing::warn!(service = %service.name, "backend unreachable, keeping last-known status");
            return Ok((service, true));
        }
        // A service whose creation job is still queued is absent from the
        // buffer report; absence only means torn down once we stop.
        if observed == ServiceStatus::Stopped && service.status == ServiceStatus::Waiting {
            return Ok((service, false));
        }
        if observed == service.status {
            return Ok((service, false));
        }

        tracing::info!(service = %service.name, from = %service.status, to = %observed,
            "service status changed");
        self.store.update_service_status(service.id, observed).await?;
        let mut updated = Service {
            status: observed,
            ..service
        };
        if observed.is_stopped() && updated.end_time.is_none() {
            let now = Utc::now();
            self.store.set_service_end_time(updated.id, now).await?;
            self.store
                .log_activity(ObjectType::Service, updated.id, Activity::Removal)
                .await?;
            updated.end_time = Some(now);
        }
        Ok((updated, false))
    }

    /// Derive a session's status from its reconciled services and write
    /// back any change.
    async fn reconcile_session(
        &self,
        session: Session,
    ) -> Result<(Session, bool), OrchestratorError> {
        if session.status.is_terminal() {
            return Ok((session, false));
        }
        let services = self
            .store
            .find_services(Predicate::any().eq(ServiceField::SessionId, session.id))
            .await?;

        // A session without services activates and stops on its own.
        if services.is_empty() {
            return match session.status {
                SessionStatus::Starting => {
                    self.store
                        .update_session_status(session.id, SessionStatus::Active)
                        .await?;
                    Ok((
                        Session {
                            status: SessionStatus::Active,
                            ..session
                        },
                        false,
                    ))
                }
                SessionStatus::Stopping => {
                    let session = self.finalize_session(&session).await?;
                    Ok((session, false))
                }
                _ => Ok((session, false)),
            };
        }

        let mut stale = false;
        let mut reconciled = Vec::with_capacity(services.len());
        for service in services {
            let (service, service_stale) = self.reconcile_service(service).await?;
            stale |= service_stale;
            reconciled.push(service);
        }

        if reconciled.iter().any(|s| s.status == ServiceStatus::Teardown) {
            self.store
                .update_session_status(session.id, SessionStatus::Teardown)
                .await?;
            return Ok((
                Session {
                    status: SessionStatus::Teardown,
                    ..session
                },
                stale,
            ));
        }
        if session.status == SessionStatus::Starting
            && reconciled.iter().all(|s| s.status.is_allocated())
        {
            self.store
                .update_session_status(session.id, SessionStatus::Active)
                .await?;
            return Ok((
                Session {
                    status: SessionStatus::Active,
                    ..session
                },
                stale,
            ));
        }
        if session.status == SessionStatus::Stopping
            && reconciled.iter().all(|s| s.status.is_stopped())
        {
            let session = self.finalize_session(&session).await?;
            return Ok((session, stale));
        }
        Ok((session, stale))
    }

    /// Re-query the scheduler for one step and write back any change.
    async fn reconcile_step(&self, step: Step) -> Result<Step, OrchestratorError> {
        let Some(jobid) = step.jobid else {
            return Ok(step);
        };
        let observed = self.drivers.jobs().get_job_status(jobid).await;
        if observed == step.status {
            return Ok(step);
        }

        let jobs = self.drivers.jobs();
        let was_stopped = jobs.to_canonical_status(&jobs.combine_status_for_output(&step.status))
            == StepStatus::Stopped;
        let now_stopped = jobs.to_canonical_status(&jobs.combine_status_for_output(&observed))
            == StepStatus::Stopped;

        self.store.update_step_status(step.id, &observed).await?;
        let mut updated = Step {
            status: observed,
            ..step
        };
        if now_stopped && !was_stopped {
            let now = Utc::now();
            self.store.set_step_stop_time(updated.id, now).await?;
            self.store
                .log_activity(ObjectType::Step, updated.id, Activity::Removal)
                .await?;
            updated.stop_time = Some(now);
        }
        Ok(updated)
    }

    // ---- internals ----

    fn ephemeral_driver(
        &self,
        kind: ServiceKind,
    ) -> Result<&Arc<dyn EphemeralServiceDriver>, OrchestratorError> {
        self.drivers.ephemeral(kind).ok_or_else(|| {
            OrchestratorError::BadRequest(format!("ephemeral service kind {kind} is not supported"))
        })
    }

    fn validate_workflow(&self, workflow: &WorkflowDescription) -> Result<(), OrchestratorError> {
        for spec in &workflow.services {
            let driver = self.ephemeral_driver(spec.kind)?;
            if let Some(reason) = driver.check_attributes(&spec.attributes) {
                return Err(OrchestratorError::BadRequest(format!(
                    "service {}: {reason}",
                    spec.name
                )));
            }
        }
        for step in &workflow.steps {
            if let Some(service) = step.service.as_deref() {
                if !workflow.services.iter().any(|s| s.name == service) {
                    return Err(OrchestratorError::BadRequest(format!(
                        "step {} uses undeclared service {service}",
                        step.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Reserve and launch one service; `Ok(Err(reason))` is a reservation
    /// or submission failure that must not abort the siblings.
    async fn launch_service(
        &self,
        session: &Session,
        spec: &ServiceSpec,
        user: &str,
    ) -> Result<Result<i64, String>, OrchestratorError> {
        let driver = self.ephemeral_driver(spec.kind)?;

        let request = driver.reservation_request(spec, user);
        if self.drivers.resources().reserve(&request).await != 0 {
            return Ok(Err(format!("reservation failed for service {}", spec.name)));
        }

        // The none kind has nothing to launch and is usable immediately.
        let initial = if spec.kind == ServiceKind::None {
            ServiceStatus::Allocated
        } else {
            ServiceStatus::Waiting
        };
        let service = self.store.add_service(session.id, spec, initial, None).await?;
        self.store
            .log_activity(ObjectType::Service, service.id, Activity::Creation)
            .await?;
        if spec.kind == ServiceKind::None {
            return Ok(Ok(service.id));
        }

        let submit = SubmitRequest {
            job_name: "create".to_string(),
            directives: Some(driver.job_directives(&service, DirectiveAction::Create)),
            command: "srun hostname".to_string(),
            partition: (!service.location.is_empty()).then(|| service.location.clone()),
            dependency: None,
        };
        match self.drivers.jobs().submit(submit).await {
            Ok(jobid) => {
                self.store.update_service_jobid(service.id, jobid).await?;
                Ok(Ok(service.id))
            }
            Err(e) => Ok(Err(format!(
                "could not launch service {}: {e}",
                spec.name
            ))),
        }
    }

    /// Reconcile all steps of a session and count those still running;
    /// with `force`, cancel their jobs first.
    async fn settle_steps(&self, session: &Session, force: bool) -> Result<usize, OrchestratorError> {
        let descriptions = self
            .store
            .find_step_descriptions(Predicate::any().eq(StepDescriptionField::SessionId, session.id))
            .await?;

        let jobs = self.drivers.jobs();
        let mut not_stopped = 0;
        for description in descriptions {
            let steps = self
                .store
                .find_steps(Predicate::any().eq(StepField::StepDescriptionId, description.id))
                .await?;
            for step in steps {
                let step = self.reconcile_step(step).await?;
                let decisive = jobs.combine_status_for_stopping(&step.status);
                if jobs.to_canonical_status(&decisive) == StepStatus::Stopped {
                    continue;
                }
                if force {
                    if let Some(jobid) = step.jobid {
                        if jobs.cancel_job(jobid).await == 0 {
                            continue;
                        }
                    }
                }
                not_stopped += 1;
            }
        }
        Ok(not_stopped)
    }

    /// Submit destroy jobs for every service still holding resources.
    /// Returns how many releases are in flight plus the failures.
    async fn release_services(
        &self,
        session: &Session,
    ) -> Result<(usize, Vec<String>), OrchestratorError> {
        let services = self
            .store
            .find_services(Predicate::any().eq(ServiceField::SessionId, session.id))
            .await?;

        let mut pending = 0;
        let mut failures = Vec::new();
        for service in services {
            let (service, _) = self.reconcile_service(service).await?;
            if service.status.is_stopped() {
                continue;
            }
            if !service.status.is_stoppable() {
                // Already stopping or in a staging transition; the
                // destroy is in flight.
                pending += 1;
                continue;
            }

            self.store
                .update_service_status(service.id, ServiceStatus::Stopping)
                .await?;
            if service.kind == ServiceKind::None {
                self.finalize_service(&service).await?;
                continue;
            }

            let driver = self.ephemeral_driver(service.kind)?;
            let submit = SubmitRequest {
                job_name: "destroy".to_string(),
                directives: Some(driver.job_directives(&service, DirectiveAction::Destroy)),
                command: "srun hostname".to_string(),
                partition: (!service.location.is_empty()).then(|| service.location.clone()),
                // Never tear down a service before the job that created it
                // has left the queue.
                dependency: service.jobid,
            };
            match self.drivers.jobs().submit(submit).await {
                Ok(_) => pending += 1,
                Err(e) => failures.push(format!("could not stop service {}: {e}", service.name)),
            }
        }
        Ok((pending, failures))
    }

    /// Soft-stop one service: terminal status, end time, removal record.
    async fn finalize_service(&self, service: &Service) -> Result<(), OrchestratorError> {
        self.store
            .update_service_status(service.id, ServiceStatus::Stopped)
            .await?;
        self.store.set_service_end_time(service.id, Utc::now()).await?;
        self.store
            .log_activity(ObjectType::Service, service.id, Activity::Removal)
            .await?;
        Ok(())
    }

    /// Soft-stop one session: terminal status, end time, removal record.
    /// The child rows stay in place.
    async fn finalize_session(&self, session: &Session) -> Result<Session, OrchestratorError> {
        self.store
            .update_session_status(session.id, SessionStatus::Stopped)
            .await?;
        let now = Utc::now();
        self.store.set_session_end_time(session.id, now).await?;
        self.store
            .log_activity(ObjectType::Session, session.id, Activity::Removal)
            .await?;
        tracing::info!(session = %session.name, "session stopped");
        Ok(Session {
            status: SessionStatus::Stopped,
            end_time: Some(now),
            ..session.clone()
        })
    }

    /// Poll reconciled status until the session reaches `target`.
    ///
    /// Bounded by the configured attempt budget; running out of attempts
    /// is a timeout, which callers must distinguish from a backend that
    /// reported failure.
    async fn wait_until(
        &self,
        session: &Session,
        target: SessionStatus,
    ) -> Result<Session, OrchestratorError> {
        for attempt in 0..self.pacing.sync_poll_attempts {
            let current = self
                .store
                .find_session(Predicate::any().eq(SessionField::Id, session.id))
                .await?
                .ok_or_else(|| {
                    OrchestratorError::NotFound(format!("session {} vanished", session.name))
                })?;
            let (current, _) = self.reconcile_session(current).await?;
            if current.status == target {
                return Ok(current);
            }
            if attempt + 1 < self.pacing.sync_poll_attempts {
                tokio::time::sleep(Duration::from_secs(self.pacing.sync_poll_interval_secs)).await;
            }
        }
        Err(OrchestratorError::TimedOut(format!(
            "timed out waiting for session {} to reach {target}",
            session.name
        )))
    }

    /// Resolve a session by name. Terminal rows are retained and a name
    /// may be reused, so the live session wins; with only terminal rows
    /// the most recent one is returned.
    async fn require_session(&self, name: &str) -> Result<Session, OrchestratorError> {
        let mut sessions = self
            .store
            .find_sessions(Predicate::any().eq(SessionField::Name, name))
            .await?;
        if sessions.is_empty() {
            return Err(OrchestratorError::NotFound(format!(
                "no session with name {name}"
            )));
        }

        let mut live: Vec<Session> = sessions
            .iter()
            .filter(|s| !s.status.is_terminal())
            .cloned()
            .collect();
        if live.len() > 1 {
            return Err(OrchestratorError::Conflict(format!(
                "session {name} is not unique"
            )));
        }
        if let Some(session) = live.pop() {
            return Ok(session);
        }
        sessions.sort_by_key(|s| s.id);
        sessions
            .pop()
            .ok_or_else(|| OrchestratorError::NotFound(format!("no session with name {name}")))
    }

    async fn step_views_of(&self, description_id: i64) -> Result<Vec<StepView>, OrchestratorError> {
        let steps = self
            .store
            .find_steps(Predicate::any().eq(StepField::StepDescriptionId, description_id))
            .await?;
        let jobs = self.drivers.jobs();
        let mut views = Vec::with_capacity(steps.len());
        for step in steps {
            let step = self.reconcile_step(step).await?;
            let combined = jobs.combine_status_for_output(&step.status);
            views.push(StepView {
                id: step.id,
                instance_name: step.instance_name,
                status: jobs.to_canonical_status(&combined),
                native_status: step.status,
                progress: step.progress,
                command: step.command,
                jobid: step.jobid,
            });
        }
        Ok(views)
    }
}

/// Apply session-level variable substitution to a workflow description.
///
/// Step commands keep their step-level placeholders; everywhere else an
/// unresolved variable is an error naming it.
fn resolve_workflow(
    workflow: &WorkflowDescription,
    vars: &HashMap<String, String>,
) -> Result<WorkflowDescription, OrchestratorError> {
    let mut resolved = workflow.clone();
    resolved.name = substitute(&resolved.name, vars);
    for spec in &mut resolved.services {
        spec.name = substitute(&spec.name, vars);
        for field in [
            &mut spec.attributes.targets,
            &mut spec.attributes.flavor,
            &mut spec.attributes.namespace,
            &mut spec.attributes.mountpoint,
            &mut spec.attributes.storagesize,
            &mut spec.attributes.dasiconfig,
            &mut spec.attributes.location,
        ] {
            if let Some(value) = field {
                *value = substitute(value, vars);
            }
        }
    }
    for step in &mut resolved.steps {
        step.name = substitute(&step.name, vars);
        if let Some(service) = &mut step.service {
            *service = substitute(service, vars);
        }
        // Commands still carry {{ STEP }} and step-level variables.
        step.command = substitute(&step.command, vars);
    }

    let mut leftovers = Vec::new();
    leftovers.extend(unresolved_variables(&resolved.name));
    for spec in &resolved.services {
        leftovers.extend(unresolved_variables(&spec.name));
        for field in [
            &spec.attributes.targets,
            &spec.attributes.flavor,
            &spec.attributes.namespace,
            &spec.attributes.mountpoint,
            &spec.attributes.storagesize,
            &spec.attributes.dasiconfig,
            &spec.attributes.location,
        ]
        .into_iter()
        .flatten()
        {
            leftovers.extend(unresolved_variables(field));
        }
    }
    if let Some(variable) = leftovers.first() {
        return Err(OrchestratorError::BadRequest(format!(
            "workflow description contains undefined variable '{variable}'"
        )));
    }
    Ok(resolved)
}
