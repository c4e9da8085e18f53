use chrono::Utc;
use metrics::counter;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition,
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::{
    code_generator::{request_category, CodeGenerator},
    ensure_exists, fetch_page, like_pattern,
    material_validator::{
        release_quantity, reserve_quantity, validate_materials, MaterialRequirement,
    },
    PageRequest, Paged,
};
use crate::{
    auth::user,
    config::ReservationMode,
    dto::requests::{
        AddRequestMaterialDto, CreateApprovalInfoDto, CreateRequestDto, MaterialTypeCount,
        RemoveRequestMaterialDto, RequestInputDto, RequestInputListQuery, RequestListQuery,
        RequestMaterialDto, StatusCount, UpdateApprovalInfoDto, UpdateRequestDto,
        UpdateRequestStatusDto,
    },
    entities::{
        customer,
        material::{self, MaterialType},
        request::{self, RequestPriority, RequestStatus},
        request_approval_info, request_input, request_material, request_status_history,
        source_other,
    },
    errors::ServiceError,
};

/// A request line joined with its material.
#[derive(Debug, Clone, Serialize)]
pub struct RequestMaterialLine {
    pub id: Uuid,
    pub material_id: Uuid,
    pub quantity: i32,
    pub material: Option<material::Model>,
}

/// A request with everything it owns.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetail {
    #[serde(flatten)]
    pub request: request::Model,
    pub materials: Vec<RequestMaterialLine>,
    pub approval_info: Option<request_approval_info::Model>,
    pub request_inputs: Vec<request_input::Model>,
}

#[derive(Debug, FromQueryResult)]
struct StatusRow {
    status: RequestStatus,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct RequestTypeRow {
    request_id: Uuid,
    material_type: MaterialType,
}

/// Rejects same-status and disallowed transitions.
pub fn check_transition(from: RequestStatus, to: RequestStatus) -> Result<(), ServiceError> {
    if from == to {
        return Err(ServiceError::BadRequest(
            "no-op transition not allowed".to_string(),
        ));
    }
    if !from.can_transition_to(to) {
        return Err(ServiceError::BadRequest(format!(
            "invalid status transition from {} to {}",
            from, to
        )));
    }
    Ok(())
}

/// Counts each request once per distinct material type it touches. Every
/// type is reported, zero counts included.
pub fn count_requests_per_material_type(
    pairs: impl IntoIterator<Item = (Uuid, MaterialType)>,
) -> Vec<MaterialTypeCount> {
    let mut seen: HashMap<MaterialType, HashSet<Uuid>> = HashMap::new();
    for (request_id, material_type) in pairs {
        seen.entry(material_type).or_default().insert(request_id);
    }
    MaterialType::iter()
        .map(|material_type| MaterialTypeCount {
            material_type,
            count: seen.get(&material_type).map_or(0, |ids| ids.len() as i64),
        })
        .collect()
}

fn requirement(dto: &RequestMaterialDto) -> MaterialRequirement {
    MaterialRequirement {
        material_id: dto.material_id,
        quantity: dto.quantity,
        expected_type: dto.material_type,
    }
}

async fn find_request<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<request::Model, ServiceError> {
    request::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Request", id))
}

async fn load_detail<C: ConnectionTrait>(
    conn: &C,
    request: request::Model,
) -> Result<RequestDetail, ServiceError> {
    let materials = request_material::Entity::find()
        .filter(request_material::Column::RequestId.eq(request.id))
        .order_by_asc(request_material::Column::CreatedAt)
        .find_also_related(material::Entity)
        .all(conn)
        .await?
        .into_iter()
        .map(|(line, material)| RequestMaterialLine {
            id: line.id,
            material_id: line.material_id,
            quantity: line.quantity,
            material,
        })
        .collect();

    let approval_info = request_approval_info::Entity::find()
        .filter(request_approval_info::Column::RequestId.eq(request.id))
        .one(conn)
        .await?;

    let request_inputs = request_input::Entity::find()
        .filter(request_input::Column::RequestId.eq(request.id))
        .all(conn)
        .await?;

    Ok(RequestDetail {
        request,
        materials,
        approval_info,
        request_inputs,
    })
}

/// Inserts or replaces the input row for `dto.material_id`.
async fn upsert_input<C: ConnectionTrait>(
    conn: &C,
    dto: RequestInputDto,
    fallback_request_id: Option<Uuid>,
) -> Result<request_input::Model, ServiceError> {
    let now = Utc::now();
    let material_id = dto.material_id;
    let row = request_input::ActiveModel {
        id: Set(Uuid::new_v4()),
        material_id: Set(material_id),
        request_id: Set(dto.request_id.or(fallback_request_id)),
        supplier: Set(dto.supplier.trim().to_string()),
        expected_date: Set(dto.expected_date),
        price: Set(dto.price),
        quantity: Set(dto.quantity),
        reason: Set(dto.reason),
        created_at: Set(now),
        updated_at: Set(now),
    };

    request_input::Entity::insert(row)
        .on_conflict(
            OnConflict::column(request_input::Column::MaterialId)
                .update_columns([
                    request_input::Column::RequestId,
                    request_input::Column::Supplier,
                    request_input::Column::ExpectedDate,
                    request_input::Column::Price,
                    request_input::Column::Quantity,
                    request_input::Column::Reason,
                    request_input::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    request_input::Entity::find()
        .filter(request_input::Column::MaterialId.eq(material_id))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::InternalError(format!("request input for {} vanished", material_id))
        })
}

/// Request aggregate: the request, its material lines, approval info,
/// inputs and status audit trail.
#[derive(Clone)]
pub struct RequestService {
    db: Arc<DatabaseConnection>,
    codes: CodeGenerator,
    reservation_mode: ReservationMode,
}

impl RequestService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        codes: CodeGenerator,
        reservation_mode: ReservationMode,
    ) -> Self {
        Self {
            db,
            codes,
            reservation_mode,
        }
    }

    pub fn reservation_mode(&self) -> ReservationMode {
        self.reservation_mode
    }

    fn reserves(&self) -> bool {
        self.reservation_mode == ReservationMode::Reserve
    }

    /// Validates `items`, inserts one line per distinct material and, in
    /// reserve mode, takes the quantities out of stock.
    async fn attach_materials(
        &self,
        txn: &DatabaseTransaction,
        request_id: Uuid,
        items: &[MaterialRequirement],
    ) -> Result<Vec<request_material::Model>, ServiceError> {
        let validated = validate_materials(txn, items).await?;
        let now = Utc::now();
        let mut lines = Vec::with_capacity(validated.len());
        for item in validated {
            let line = request_material::ActiveModel {
                id: Set(Uuid::new_v4()),
                request_id: Set(request_id),
                material_id: Set(item.material.id),
                quantity: Set(item.quantity),
                created_at: Set(now),
            }
            .insert(txn)
            .await?;
            if self.reserves() {
                reserve_quantity(txn, item.material.id, item.quantity).await?;
            }
            lines.push(line);
        }
        Ok(lines)
    }

    /// Deletes every line of the request, putting reserved stock back.
    async fn detach_all_materials(
        &self,
        txn: &DatabaseTransaction,
        request_id: Uuid,
    ) -> Result<u64, ServiceError> {
        if self.reserves() {
            let lines = request_material::Entity::find()
                .filter(request_material::Column::RequestId.eq(request_id))
                .all(txn)
                .await?;
            for line in &lines {
                release_quantity(txn, line.material_id, line.quantity).await?;
            }
        }
        let result = request_material::Entity::delete_many()
            .filter(request_material::Column::RequestId.eq(request_id))
            .exec(txn)
            .await?;
        Ok(result.rows_affected)
    }

    /// Moves the request to `next` and appends an audit row.
    async fn transition(
        &self,
        txn: &DatabaseTransaction,
        current: request::Model,
        next: RequestStatus,
        actor: Option<Uuid>,
        note: Option<String>,
    ) -> Result<request::Model, ServiceError> {
        let from = current.status;
        check_transition(from, next)?;
        let now = Utc::now();

        let mut active: request::ActiveModel = current.into();
        active.status = Set(next);
        active.updated_at = Set(now);
        let updated = active.update(txn).await?;

        request_status_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            request_id: Set(updated.id),
            from_status: Set(from),
            to_status: Set(next),
            changed_by: Set(actor),
            note: Set(note),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;

        info!(request_id = %updated.id, %from, to = %next, "request status changed");
        Ok(updated)
    }

    /// Creates a request with its materials and optional input in one
    /// transaction.
    #[instrument(skip(self, dto), fields(title = %dto.title))]
    pub async fn create(
        &self,
        dto: CreateRequestDto,
        actor: Option<Uuid>,
    ) -> Result<RequestDetail, ServiceError> {
        dto.validate()?;
        let db = self.db.as_ref();
        let created_by = dto.created_by.or(actor);

        futures::try_join!(
            ensure_exists::<customer::Entity, _>(db, dto.customer_id, "Customer"),
            ensure_exists::<user::Entity, _>(db, created_by, "User"),
            ensure_exists::<source_other::Entity, _>(db, dto.source_other_id, "SourceOther"),
        )?;
        if let Some(input) = &dto.request_input {
            ensure_exists::<material::Entity, _>(db, Some(input.material_id), "Material").await?;
        }

        let category = request_category(dto.customer_id, dto.source_other_id);
        let code = self.codes.generate_request_code(category).await?;
        let requirements: Vec<MaterialRequirement> =
            dto.materials.iter().map(requirement).collect();

        let txn = db.begin().await?;
        let now = Utc::now();
        let request_id = Uuid::new_v4();
        let request = request::ActiveModel {
            id: Set(request_id),
            code: Set(Some(code)),
            title: Set(dto.title.trim().to_string()),
            description: Set(dto.description),
            product_links: Set(serde_json::Value::from(dto.product_links)),
            media: Set(serde_json::Value::from(dto.media)),
            source: Set(dto.source),
            status: Set(RequestStatus::Pending),
            priority: Set(dto.priority.unwrap_or(RequestPriority::Medium)),
            customer_id: Set(dto.customer_id),
            source_other_id: Set(dto.source_other_id),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        self.attach_materials(&txn, request_id, &requirements).await?;
        if let Some(input) = dto.request_input {
            upsert_input(&txn, input, Some(request_id)).await?;
        }
        let detail = load_detail(&txn, request).await?;
        txn.commit().await?;

        counter!("mfg_requests.created", 1);
        info!(request_id = %request_id, code = ?detail.request.code, "request created");
        Ok(detail)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<RequestDetail, ServiceError> {
        let db = self.db.as_ref();
        let request = find_request(db, id).await?;
        load_detail(db, request).await
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        query: &RequestListQuery,
        page: PageRequest,
    ) -> Result<Paged<request::Model>, ServiceError> {
        let mut select = request::Entity::find();
        if let Some(status) = query.status {
            select = select.filter(request::Column::Status.eq(status));
        }
        if let Some(source) = query.source {
            select = select.filter(request::Column::Source.eq(source));
        }
        if let Some(priority) = query.priority {
            select = select.filter(request::Column::Priority.eq(priority));
        }
        if let Some(customer_id) = query.customer_id {
            select = select.filter(request::Column::CustomerId.eq(customer_id));
        }
        if let Some(pattern) = like_pattern(query.search.as_deref()) {
            select = select.filter(
                Condition::any()
                    .add(request::Column::Title.like(pattern.clone()))
                    .add(request::Column::Code.like(pattern)),
            );
        }
        fetch_page(
            select.order_by_desc(request::Column::CreatedAt),
            self.db.as_ref(),
            page,
        )
        .await
    }

    /// Patches the request. A `materials` list replaces the whole material
    /// set.
    #[instrument(skip(self, dto))]
    pub async fn update(
        &self,
        id: Uuid,
        dto: UpdateRequestDto,
    ) -> Result<RequestDetail, ServiceError> {
        dto.validate()?;
        if let Some(materials) = &dto.materials {
            for line in materials {
                line.validate()?;
            }
        }
        let db = self.db.as_ref();
        let existing = find_request(db, id).await?;

        futures::try_join!(
            ensure_exists::<customer::Entity, _>(db, dto.customer_id, "Customer"),
            ensure_exists::<source_other::Entity, _>(db, dto.source_other_id, "SourceOther"),
        )?;
        if let Some(input) = &dto.request_input {
            ensure_exists::<material::Entity, _>(db, Some(input.material_id), "Material").await?;
        }

        let txn = db.begin().await?;
        if let Some(materials) = &dto.materials {
            let released = self.detach_all_materials(&txn, id).await?;
            let requirements: Vec<MaterialRequirement> =
                materials.iter().map(requirement).collect();
            let attached = self.attach_materials(&txn, id, &requirements).await?;
            info!(request_id = %id, released, attached = attached.len(), "request materials replaced");
        }
        if let Some(input) = dto.request_input {
            upsert_input(&txn, input, Some(id)).await?;
        }

        let mut active: request::ActiveModel = existing.into();
        if let Some(title) = dto.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = dto.description {
            active.description = Set(Some(description));
        }
        if let Some(links) = dto.product_links {
            active.product_links = Set(serde_json::Value::from(links));
        }
        if let Some(media) = dto.media {
            active.media = Set(serde_json::Value::from(media));
        }
        if let Some(source) = dto.source {
            active.source = Set(source);
        }
        if let Some(priority) = dto.priority {
            active.priority = Set(priority);
        }
        if dto.customer_id.is_some() {
            active.customer_id = Set(dto.customer_id);
        }
        if dto.source_other_id.is_some() {
            active.source_other_id = Set(dto.source_other_id);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        let detail = load_detail(&txn, updated).await?;
        txn.commit().await?;
        Ok(detail)
    }

    /// Changes status without an audit row.
    #[instrument(skip(self, dto))]
    pub async fn update_status(
        &self,
        id: Uuid,
        dto: UpdateRequestStatusDto,
    ) -> Result<request::Model, ServiceError> {
        dto.validate()?;
        let db = self.db.as_ref();
        let current = find_request(db, id).await?;
        check_transition(current.status, dto.status)?;

        let mut active: request::ActiveModel = current.into();
        active.status = Set(dto.status);
        active.updated_at = Set(Utc::now());
        Ok(active.update(db).await?)
    }

    #[instrument(skip(self, dto))]
    pub async fn update_status_with_history(
        &self,
        id: Uuid,
        dto: UpdateRequestStatusDto,
        actor: Option<Uuid>,
    ) -> Result<request::Model, ServiceError> {
        dto.validate()?;
        let txn = self.db.begin().await?;
        let current = find_request(&txn, id).await?;
        let updated = self
            .transition(&txn, current, dto.status, actor, dto.note)
            .await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Audit rows for a request, newest first.
    #[instrument(skip(self))]
    pub async fn status_history(
        &self,
        id: Uuid,
    ) -> Result<Vec<request_status_history::Model>, ServiceError> {
        let db = self.db.as_ref();
        find_request(db, id).await?;
        Ok(request_status_history::Entity::find()
            .filter(request_status_history::Column::RequestId.eq(id))
            .order_by_desc(request_status_history::Column::CreatedAt)
            .all(db)
            .await?)
    }

    /// Deletes a request and the rows it owns. Refused once the request
    /// carries approval info.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        find_request(&txn, id).await?;

        let approved = request_approval_info::Entity::find()
            .filter(request_approval_info::Column::RequestId.eq(id))
            .one(&txn)
            .await?;
        if approved.is_some() {
            warn!(request_id = %id, "delete refused, approval info present");
            return Err(ServiceError::Conflict(format!(
                "request {} has approval info and cannot be deleted",
                id
            )));
        }

        self.detach_all_materials(&txn, id).await?;
        request_input::Entity::delete_many()
            .filter(request_input::Column::RequestId.eq(id))
            .exec(&txn)
            .await?;
        request_status_history::Entity::delete_many()
            .filter(request_status_history::Column::RequestId.eq(id))
            .exec(&txn)
            .await?;
        request::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        counter!("mfg_requests.deleted", 1);
        info!(request_id = %id, "request deleted");
        Ok(())
    }

    #[instrument(skip(self, dto))]
    pub async fn add_material(
        &self,
        request_id: Uuid,
        dto: AddRequestMaterialDto,
    ) -> Result<request_material::Model, ServiceError> {
        dto.validate()?;
        let txn = self.db.begin().await?;
        find_request(&txn, request_id).await?;

        let attached = request_material::Entity::find()
            .filter(request_material::Column::RequestId.eq(request_id))
            .filter(request_material::Column::MaterialId.eq(dto.material_id))
            .one(&txn)
            .await?;
        if attached.is_some() {
            return Err(ServiceError::Conflict(format!(
                "material {} is already on request {}",
                dto.material_id, request_id
            )));
        }

        let mut lines = self
            .attach_materials(
                &txn,
                request_id,
                &[MaterialRequirement::new(dto.material_id, dto.quantity)],
            )
            .await?;
        let line = lines
            .pop()
            .ok_or_else(|| ServiceError::InternalError("material line not inserted".into()))?;
        txn.commit().await?;
        Ok(line)
    }

    #[instrument(skip(self))]
    pub async fn remove_material(
        &self,
        request_id: Uuid,
        dto: RemoveRequestMaterialDto,
    ) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let line = request_material::Entity::find_by_id(dto.material_request_id)
            .filter(request_material::Column::RequestId.eq(request_id))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "material line {} not found on request {}",
                    dto.material_request_id, request_id
                ))
            })?;

        request_material::Entity::delete_by_id(line.id)
            .exec(&txn)
            .await?;
        if self.reserves() {
            release_quantity(&txn, line.material_id, line.quantity).await?;
        }
        txn.commit().await?;
        Ok(())
    }

    /// Number of requests in each status, zero counts included.
    #[instrument(skip(self))]
    pub async fn statistics_by_status(&self) -> Result<Vec<StatusCount>, ServiceError> {
        let rows: HashMap<RequestStatus, i64> = request::Entity::find()
            .select_only()
            .column(request::Column::Status)
            .column_as(request::Column::Id.count(), "count")
            .group_by(request::Column::Status)
            .into_model::<StatusRow>()
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|row| (row.status, row.count))
            .collect();

        Ok(RequestStatus::iter()
            .map(|status| StatusCount {
                status,
                count: rows.get(&status).copied().unwrap_or(0),
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn statistics_by_material_type(
        &self,
    ) -> Result<Vec<MaterialTypeCount>, ServiceError> {
        let rows = request_material::Entity::find()
            .select_only()
            .column(request_material::Column::RequestId)
            .column(material::Column::MaterialType)
            .join(JoinType::InnerJoin, request_material::Relation::Material.def())
            .distinct()
            .into_model::<RequestTypeRow>()
            .all(self.db.as_ref())
            .await?;

        Ok(count_requests_per_material_type(
            rows.into_iter().map(|row| (row.request_id, row.material_type)),
        ))
    }

    /// Records the approval decision and applies the status it implies.
    #[instrument(skip(self, dto))]
    pub async fn create_approval_info(
        &self,
        request_id: Uuid,
        dto: CreateApprovalInfoDto,
        actor: Option<Uuid>,
    ) -> Result<request_approval_info::Model, ServiceError> {
        dto.validate()?;
        let txn = self.db.begin().await?;
        let request = find_request(&txn, request_id).await?;

        let existing = request_approval_info::Entity::find()
            .filter(request_approval_info::Column::RequestId.eq(request_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "approval info already exists for request {}",
                request_id
            )));
        }

        let target = dto.approval_type.target_status();
        let already_applied = request.status == target;
        if !already_applied {
            check_transition(request.status, target)?;
        }

        let now = Utc::now();
        let info = request_approval_info::ActiveModel {
            id: Set(Uuid::new_v4()),
            request_id: Set(request_id),
            approval_type: Set(dto.approval_type),
            hold_reason: Set(dto.hold_reason),
            deny_reason: Set(dto.deny_reason),
            production_plan: Set(dto.production_plan),
            files: Set(serde_json::Value::from(dto.files)),
            approved_by: Set(actor),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        if !already_applied {
            let note = dto
                .note
                .or_else(|| Some(format!("approval: {}", dto.approval_type)));
            self.transition(&txn, request, target, actor, note).await?;
        }
        txn.commit().await?;
        Ok(info)
    }

    #[instrument(skip(self))]
    pub async fn get_approval_info(
        &self,
        request_id: Uuid,
    ) -> Result<request_approval_info::Model, ServiceError> {
        request_approval_info::Entity::find()
            .filter(request_approval_info::Column::RequestId.eq(request_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("approval info for request {} not found", request_id))
            })
    }

    /// Edits the reasons, plan and files. The decision itself is fixed.
    #[instrument(skip(self, dto))]
    pub async fn update_approval_info(
        &self,
        request_id: Uuid,
        dto: UpdateApprovalInfoDto,
    ) -> Result<request_approval_info::Model, ServiceError> {
        dto.validate()?;
        let current = self.get_approval_info(request_id).await?;

        let mut active: request_approval_info::ActiveModel = current.into();
        if let Some(reason) = dto.hold_reason {
            active.hold_reason = Set(Some(reason));
        }
        if let Some(reason) = dto.deny_reason {
            active.deny_reason = Set(Some(reason));
        }
        if let Some(plan) = dto.production_plan {
            active.production_plan = Set(Some(plan));
        }
        if let Some(files) = dto.files {
            active.files = Set(serde_json::Value::from(files));
        }
        active.updated_at = Set(Utc::now());
        Ok(active.update(self.db.as_ref()).await?)
    }

    /// One input row per material; a second upsert overwrites the first.
    #[instrument(skip(self, dto), fields(material_id = %dto.material_id))]
    pub async fn upsert_request_input(
        &self,
        dto: RequestInputDto,
    ) -> Result<request_input::Model, ServiceError> {
        dto.validate()?;
        let db = self.db.as_ref();
        futures::try_join!(
            ensure_exists::<material::Entity, _>(db, Some(dto.material_id), "Material"),
            ensure_exists::<request::Entity, _>(db, dto.request_id, "Request"),
        )?;

        let txn = db.begin().await?;
        let input = upsert_input(&txn, dto, None).await?;
        txn.commit().await?;
        Ok(input)
    }

    #[instrument(skip(self))]
    pub async fn list_request_inputs(
        &self,
        query: &RequestInputListQuery,
        page: PageRequest,
    ) -> Result<Paged<request_input::Model>, ServiceError> {
        let mut select = request_input::Entity::find();
        if let Some(request_id) = query.request_id {
            select = select.filter(request_input::Column::RequestId.eq(request_id));
        }
        fetch_page(
            select.order_by_desc(request_input::Column::UpdatedAt),
            self.db.as_ref(),
            page,
        )
        .await
    }
}
