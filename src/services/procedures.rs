use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{ensure_exists, fetch_page, like_pattern, PageRequest, Paged};
use crate::{
    dto::procedures::{
        CreateProcedureDto, CreateSubprocessDto, ProcedureListQuery, SubprocessProgressDto,
        SwapStepsDto, UpdateProcedureDto, UpdateSubprocessDto,
    },
    entities::{
        department, procedure,
        subprocess::{self, SubprocessStatus},
        subprocess_history,
    },
    errors::ServiceError,
};

/// Placeholder step held by one side of a swap so the unique index never
/// sees two rows on the same step.
const SWAP_PARKING_STEP: i32 = -1;

#[derive(Debug, Clone, Serialize)]
pub struct ProcedureDetail {
    #[serde(flatten)]
    pub procedure: procedure::Model,
    pub subprocesses: Vec<subprocess::Model>,
}

/// Steps in a new procedure must not repeat within one department.
fn check_unique_steps(items: &[CreateSubprocessDto]) -> Result<(), ServiceError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert((item.department_id, item.step)) {
            return Err(ServiceError::Conflict(format!(
                "step {} appears twice for the same department",
                item.step
            )));
        }
    }
    Ok(())
}

fn check_progress(
    current: &subprocess::Model,
    next: SubprocessStatus,
) -> Result<(), ServiceError> {
    if current.status == next {
        return Err(ServiceError::BadRequest(
            "no-op transition not allowed".to_string(),
        ));
    }
    if next == SubprocessStatus::Skipped && current.is_required {
        return Err(ServiceError::BadRequest(format!(
            "step {} is required and cannot be skipped",
            current.step
        )));
    }
    Ok(())
}

async fn ensure_step_free<C: ConnectionTrait>(
    conn: &C,
    procedure_id: Uuid,
    department_id: Option<Uuid>,
    step: i32,
    exclude: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut select = subprocess::Entity::find()
        .filter(subprocess::Column::ProcedureId.eq(procedure_id))
        .filter(subprocess::Column::Step.eq(step));
    select = match department_id {
        Some(id) => select.filter(subprocess::Column::DepartmentId.eq(id)),
        None => select.filter(subprocess::Column::DepartmentId.is_null()),
    };
    if let Some(id) = exclude {
        select = select.filter(subprocess::Column::Id.ne(id));
    }
    if select.one(conn).await?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "step {} is already taken in this procedure and department",
            step
        )));
    }
    Ok(())
}

async fn insert_subprocess<C: ConnectionTrait>(
    conn: &C,
    procedure_id: Uuid,
    dto: CreateSubprocessDto,
) -> Result<subprocess::Model, ServiceError> {
    let now = Utc::now();
    Ok(subprocess::ActiveModel {
        id: Set(Uuid::new_v4()),
        procedure_id: Set(procedure_id),
        department_id: Set(dto.department_id),
        role: Set(dto.role),
        name: Set(dto.name.trim().to_string()),
        description: Set(dto.description),
        step: Set(dto.step),
        estimated_duration_minutes: Set(dto.estimated_duration_minutes),
        is_required: Set(dto.is_required),
        has_cost: Set(dto.has_cost),
        status: Set(SubprocessStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?)
}

/// Procedures and their ordered subprocess steps.
#[derive(Clone)]
pub struct ProcedureService {
    db: Arc<DatabaseConnection>,
}

impl ProcedureService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn subprocesses_of<C: ConnectionTrait>(
        conn: &C,
        procedure_id: Uuid,
    ) -> Result<Vec<subprocess::Model>, ServiceError> {
        Ok(subprocess::Entity::find()
            .filter(subprocess::Column::ProcedureId.eq(procedure_id))
            .order_by_asc(subprocess::Column::DepartmentId)
            .order_by_asc(subprocess::Column::Step)
            .all(conn)
            .await?)
    }

    async fn find_procedure<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<procedure::Model, ServiceError> {
        procedure::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Procedure", id))
    }

    async fn find_subprocess<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<subprocess::Model, ServiceError> {
        subprocess::Entity::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Subprocess", id))
    }

    /// Creates a procedure with its initial steps. Without an explicit
    /// version the next free version for the name is used.
    #[instrument(skip(self, dto), fields(name = %dto.name))]
    pub async fn create(&self, dto: CreateProcedureDto) -> Result<ProcedureDetail, ServiceError> {
        dto.validate()?;
        check_unique_steps(&dto.subprocesses)?;
        let db = self.db.as_ref();
        for department_id in dto.subprocesses.iter().filter_map(|s| s.department_id) {
            ensure_exists::<department::Entity, _>(db, Some(department_id), "Department").await?;
        }

        let name = dto.name.trim().to_string();
        let txn = db.begin().await?;
        let version = match dto.version {
            Some(version) => version,
            None => {
                let latest: Option<i32> = procedure::Entity::find()
                    .select_only()
                    .column_as(procedure::Column::Version.max(), "version")
                    .filter(procedure::Column::Name.eq(name.clone()))
                    .into_tuple::<Option<i32>>()
                    .one(&txn)
                    .await?
                    .flatten();
                latest.unwrap_or(0) + 1
            }
        };

        let now = Utc::now();
        let created = procedure::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            version: Set(version),
            description: Set(dto.description),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for step in dto.subprocesses {
            insert_subprocess(&txn, created.id, step).await?;
        }
        let subprocesses = Self::subprocesses_of(&txn, created.id).await?;
        txn.commit().await?;

        info!(procedure_id = %created.id, version, steps = subprocesses.len(), "procedure created");
        Ok(ProcedureDetail {
            procedure: created,
            subprocesses,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<ProcedureDetail, ServiceError> {
        let db = self.db.as_ref();
        let procedure = Self::find_procedure(db, id).await?;
        let subprocesses = Self::subprocesses_of(db, id).await?;
        Ok(ProcedureDetail {
            procedure,
            subprocesses,
        })
    }

    pub async fn list(
        &self,
        query: &ProcedureListQuery,
        page: PageRequest,
    ) -> Result<Paged<procedure::Model>, ServiceError> {
        let mut select = procedure::Entity::find();
        if let Some(pattern) = like_pattern(query.search.as_deref()) {
            select = select.filter(procedure::Column::Name.like(pattern));
        }
        fetch_page(
            select
                .order_by_asc(procedure::Column::Name)
                .order_by_desc(procedure::Column::Version),
            self.db.as_ref(),
            page,
        )
        .await
    }

    #[instrument(skip(self, dto))]
    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateProcedureDto,
    ) -> Result<procedure::Model, ServiceError> {
        dto.validate()?;
        let db = self.db.as_ref();
        let mut active: procedure::ActiveModel = Self::find_procedure(db, id).await?.into();
        if let Some(name) = dto.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(version) = dto.version {
            active.version = Set(version);
        }
        if let Some(description) = dto.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(db).await?)
    }

    /// Deletes the procedure, its steps and their history.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        Self::find_procedure(&txn, id).await?;
        subprocess_history::Entity::delete_many()
            .filter(subprocess_history::Column::ProcedureId.eq(id))
            .exec(&txn)
            .await?;
        subprocess::Entity::delete_many()
            .filter(subprocess::Column::ProcedureId.eq(id))
            .exec(&txn)
            .await?;
        procedure::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        info!(procedure_id = %id, "procedure deleted");
        Ok(())
    }

    pub async fn list_subprocesses(
        &self,
        procedure_id: Uuid,
    ) -> Result<Vec<subprocess::Model>, ServiceError> {
        let db = self.db.as_ref();
        Self::find_procedure(db, procedure_id).await?;
        Self::subprocesses_of(db, procedure_id).await
    }

    #[instrument(skip(self, dto), fields(step = dto.step))]
    pub async fn create_subprocess(
        &self,
        procedure_id: Uuid,
        dto: CreateSubprocessDto,
    ) -> Result<subprocess::Model, ServiceError> {
        dto.validate()?;
        let db = self.db.as_ref();
        Self::find_procedure(db, procedure_id).await?;
        ensure_exists::<department::Entity, _>(db, dto.department_id, "Department").await?;
        ensure_step_free(db, procedure_id, dto.department_id, dto.step, None).await?;
        insert_subprocess(db, procedure_id, dto).await
    }

    pub async fn get_subprocess(&self, id: Uuid) -> Result<subprocess::Model, ServiceError> {
        Self::find_subprocess(self.db.as_ref(), id).await
    }

    #[instrument(skip(self, dto))]
    pub async fn update_subprocess(
        &self,
        id: Uuid,
        dto: UpdateSubprocessDto,
    ) -> Result<subprocess::Model, ServiceError> {
        dto.validate()?;
        let db = self.db.as_ref();
        let current = Self::find_subprocess(db, id).await?;
        ensure_exists::<department::Entity, _>(db, dto.department_id, "Department").await?;

        let department_id = dto.department_id.or(current.department_id);
        let step = dto.step.unwrap_or(current.step);
        if department_id != current.department_id || step != current.step {
            ensure_step_free(db, current.procedure_id, department_id, step, Some(id)).await?;
        }

        let mut active: subprocess::ActiveModel = current.into();
        active.department_id = Set(department_id);
        active.step = Set(step);
        if let Some(role) = dto.role {
            active.role = Set(Some(role));
        }
        if let Some(name) = dto.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = dto.description {
            active.description = Set(Some(description));
        }
        if let Some(minutes) = dto.estimated_duration_minutes {
            active.estimated_duration_minutes = Set(minutes);
        }
        if let Some(is_required) = dto.is_required {
            active.is_required = Set(is_required);
        }
        if let Some(has_cost) = dto.has_cost {
            active.has_cost = Set(has_cost);
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_subprocess(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        Self::find_subprocess(&txn, id).await?;
        subprocess_history::Entity::delete_many()
            .filter(subprocess_history::Column::SubprocessId.eq(id))
            .exec(&txn)
            .await?;
        subprocess::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Exchanges the steps of two subprocesses of the same procedure and
    /// department.
    #[instrument(skip(self))]
    pub async fn swap_steps(
        &self,
        dto: SwapStepsDto,
    ) -> Result<(subprocess::Model, subprocess::Model), ServiceError> {
        if dto.first_id == dto.second_id {
            return Err(ServiceError::BadRequest(
                "cannot swap a subprocess with itself".to_string(),
            ));
        }
        let txn = self.db.begin().await?;
        let first = Self::find_subprocess(&txn, dto.first_id).await?;
        let second = Self::find_subprocess(&txn, dto.second_id).await?;
        if first.procedure_id != second.procedure_id || first.department_id != second.department_id
        {
            return Err(ServiceError::BadRequest(
                "only steps of the same procedure and department can be swapped".to_string(),
            ));
        }

        let (first_step, second_step) = (first.step, second.step);
        let now = Utc::now();

        let mut parked: subprocess::ActiveModel = first.into();
        parked.step = Set(SWAP_PARKING_STEP);
        let parked = parked.update(&txn).await?;

        let mut moved: subprocess::ActiveModel = second.into();
        moved.step = Set(first_step);
        moved.updated_at = Set(now);
        let second = moved.update(&txn).await?;

        let mut settled: subprocess::ActiveModel = parked.into();
        settled.step = Set(second_step);
        settled.updated_at = Set(now);
        let first = settled.update(&txn).await?;

        txn.commit().await?;
        debug!(first = %first.id, second = %second.id, "steps swapped");
        Ok((first, second))
    }

    /// Moves a subprocess to a new status and records it.
    #[instrument(skip(self, dto))]
    pub async fn progress(
        &self,
        id: Uuid,
        dto: SubprocessProgressDto,
        actor: Option<Uuid>,
    ) -> Result<subprocess::Model, ServiceError> {
        dto.validate()?;
        let txn = self.db.begin().await?;
        let current = Self::find_subprocess(&txn, id).await?;
        check_progress(&current, dto.status)?;

        let from = current.status;
        let now = Utc::now();
        let mut active: subprocess::ActiveModel = current.into();
        active.status = Set(dto.status);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        subprocess_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            subprocess_id: Set(updated.id),
            procedure_id: Set(updated.procedure_id),
            step: Set(updated.step),
            from_status: Set(from),
            to_status: Set(dto.status),
            changed_by: Set(actor),
            note: Set(dto.note),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(subprocess_id = %id, %from, to = %updated.status, "subprocess progressed");
        Ok(updated)
    }

    /// Status changes of a subprocess, newest first.
    pub async fn history(
        &self,
        subprocess_id: Uuid,
    ) -> Result<Vec<subprocess_history::Model>, ServiceError> {
        let db = self.db.as_ref();
        Self::find_subprocess(db, subprocess_id).await?;
        Ok(subprocess_history::Entity::find()
            .filter(subprocess_history::Column::SubprocessId.eq(subprocess_id))
            .order_by_desc(subprocess_history::Column::CreatedAt)
            .all(db)
            .await?)
    }
}
