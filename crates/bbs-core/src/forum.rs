//! [`Forum`]: every board operation, with its access and consistency rules.
//!
//! Handlers call exactly one `Forum` method per request. Each method takes
//! the [`Viewer`] making the request and enforces:
//!
//! - role requirements (member < moderator < administrator),
//! - input normalisation (trimmed text, lowercase usernames and tags),
//! - referential consistency (a reply belongs to the topic in its URL),
//! - soft-delete gating (deleted rows are `NotFound` for non-elevated
//!   viewers),
//! - posting bans for suspended and disabled accounts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{Actor, Viewer},
  board::{
    Category, CategoryPatch, MAX_BODY, MAX_TITLE, NewCategory, NewReply, NewTopic,
    Reply, ReplyPatch, Topic, TopicPatch, TopicStatus,
  },
  entity::{Entity, now},
  member::{
    AccountStatus, Credential, Member, MemberPatch, Registration, Role,
    hash_password, normalize_username,
  },
  moderation::{
    ActionKind, ModerationAction, NewAction, NewReport, NewSuspension, Report,
    ReportStatus, Suspension, TargetKind,
  },
  query::{ListQuery, Paginated, Predicate},
  search::{
    ActionSearch, CategorySearch, MemberSearch, ReplySearch, ReportSearch,
    SuspensionSearch, TagSearch, TopicSearch,
  },
  store::BoardStore,
  tag::{NewTag, Tag, normalize_tag, normalize_tags},
  validate,
};

fn store_err<E: Into<Error>>(e: E) -> Error { e.into() }

/// Predicate for suspensions of `member_id` still in force at `at`.
fn active_suspensions(member_id: Uuid, at: DateTime<Utc>) -> Predicate {
  Predicate::new()
    .eq("member_id", Some(member_id))
    .is_null("lifted_at")
    .null_or_gte("ends_at", at)
}

/// The board service. Cloning is cheap; the store is shared.
pub struct Forum<S> {
  store: Arc<S>,
}

impl<S> Clone for Forum<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: BoardStore> Forum<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  // ─── Store helpers ─────────────────────────────────────────────────────────

  async fn load<E: Entity>(&self, id: Uuid) -> Result<E> {
    self
      .store
      .get::<E>(id)
      .await
      .map_err(store_err)?
      .ok_or_else(|| Error::not_found::<E>(id))
  }

  async fn find<E: Entity>(&self, predicate: Predicate) -> Result<Option<E>> {
    self.store.find_one::<E>(predicate).await.map_err(store_err)
  }

  async fn insert<E: Entity>(&self, entity: E) -> Result<E> {
    self.store.insert(entity).await.map_err(store_err)
  }

  async fn save<E: Entity>(&self, entity: E) -> Result<E> {
    self.store.update(entity).await.map_err(store_err)
  }

  async fn count<E: Entity>(&self, predicate: Predicate) -> Result<u64> {
    self.store.count::<E>(predicate).await.map_err(store_err)
  }

  async fn list<E: Entity>(&self, query: ListQuery) -> Result<Paginated<E>> {
    self.store.search::<E>(query).await.map_err(store_err)
  }

  /// The viewer's member row as stored now. The token only names the
  /// member; role and status always come from here.
  async fn current_member(&self, viewer: &Viewer) -> Result<Member> {
    let actor = viewer.actor()?;
    let member = self
      .store
      .get::<Member>(actor.member_id)
      .await
      .map_err(store_err)?
      .ok_or(Error::Unauthorized)?;
    if member.account_status == AccountStatus::Disabled {
      return Err(Error::forbidden("account is disabled"));
    }
    Ok(member)
  }

  /// The current actor, whatever their role.
  async fn current_actor(&self, viewer: &Viewer) -> Result<Actor> {
    let member = self.current_member(viewer).await?;
    Ok(Actor { member_id: member.member_id, role: member.role })
  }

  /// The current actor, provided their stored role is at least `min`.
  async fn require_staff(&self, viewer: &Viewer, min: Role) -> Result<Actor> {
    let actor = self.current_actor(viewer).await?;
    Viewer::Member(actor).require_role(min)
  }

  /// The current actor, provided their account may currently post.
  async fn require_poster(&self, viewer: &Viewer) -> Result<Actor> {
    let member = self.current_member(viewer).await?;
    if member.account_status == AccountStatus::Suspended {
      let active = self
        .count::<Suspension>(active_suspensions(member.member_id, now()))
        .await?;
      if active > 0 {
        return Err(Error::forbidden("account is suspended"));
      }
    }
    Ok(Actor { member_id: member.member_id, role: member.role })
  }

  // ─── Members ───────────────────────────────────────────────────────────────

  pub async fn register(&self, registration: Registration) -> Result<Member> {
    let (username, email, display_name) = registration.validate()?;
    let password_hash = hash_password(&registration.password)?;
    self
      .create_member(username, email, display_name, Role::Member, password_hash)
      .await
  }

  /// Ensure an administrator account named `username` exists with the given
  /// pre-hashed password. Used at server start.
  pub async fn bootstrap_admin(
    &self,
    username: &str,
    email: &str,
    password_hash: String,
  ) -> Result<Member> {
    let username = normalize_username(username)?;
    let existing = self
      .find::<Member>(Predicate::new().eq("username", Some(username.as_str())))
      .await?;

    let Some(mut member) = existing else {
      return self
        .create_member(
          username,
          email.to_lowercase(),
          None,
          Role::Administrator,
          password_hash,
        )
        .await;
    };

    if member.role != Role::Administrator
      || member.account_status != AccountStatus::Active
    {
      member.role = Role::Administrator;
      member.account_status = AccountStatus::Active;
      member.updated_at = now();
      member = self.save(member).await?;
    }
    self
      .save(Credential { member_id: member.member_id, password_hash })
      .await?;
    info!(member_id = %member.member_id, "administrator account refreshed");
    Ok(member)
  }

  async fn create_member(
    &self,
    username: String,
    email: String,
    display_name: Option<String>,
    role: Role,
    password_hash: String,
  ) -> Result<Member> {
    let taken = self
      .find::<Member>(Predicate::new().eq("username", Some(username.as_str())))
      .await?;
    if taken.is_some() {
      return Err(Error::Conflict(format!("username {username:?} is taken")));
    }

    let at = now();
    let member = self
      .insert(Member {
        member_id: Uuid::new_v4(),
        username,
        email,
        display_name,
        role,
        account_status: AccountStatus::Active,
        created_at: at,
        updated_at: at,
      })
      .await?;
    self
      .insert(Credential { member_id: member.member_id, password_hash })
      .await?;

    info!(
      member_id = %member.member_id,
      username = %member.username,
      role = member.role.as_str(),
      "member registered"
    );
    Ok(member)
  }

  /// Check a username/password pair. Suspended members may still sign in
  /// (to read); disabled accounts may not.
  pub async fn authenticate(&self, username: &str, password: &str) -> Result<Member> {
    let username =
      normalize_username(username).map_err(|_| Error::InvalidCredentials)?;
    let member = self
      .find::<Member>(Predicate::new().eq("username", Some(username.as_str())))
      .await?
      .ok_or(Error::InvalidCredentials)?;
    let credential = self
      .store
      .get::<Credential>(member.member_id)
      .await
      .map_err(store_err)?
      .ok_or(Error::InvalidCredentials)?;

    if !credential.verify(password) {
      warn!(username = %member.username, "failed sign-in");
      return Err(Error::InvalidCredentials);
    }
    if member.account_status == AccountStatus::Disabled {
      return Err(Error::forbidden("account is disabled"));
    }
    Ok(member)
  }

  pub async fn get_member(&self, viewer: &Viewer, id: Uuid) -> Result<Member> {
    viewer.actor()?;
    self.load(id).await
  }

  pub async fn search_members(
    &self,
    viewer: &Viewer,
    search: &MemberSearch,
  ) -> Result<Paginated<Member>> {
    self.require_staff(viewer, Role::Moderator).await?;
    self.list(search.to_query()?).await
  }

  pub async fn update_profile(
    &self,
    viewer: &Viewer,
    id: Uuid,
    patch: MemberPatch,
  ) -> Result<Member> {
    let actor = self.current_actor(viewer).await?;
    if actor.member_id != id && actor.role < Role::Administrator {
      return Err(Error::forbidden("cannot edit another member's profile"));
    }
    let mut member: Member = self.load(id).await?;

    if let Some(email) = patch.email.as_deref() {
      member.email = validate::email(email)?;
    }
    if let Some(name) = patch.display_name.as_deref() {
      member.display_name = validate::optional_text("display_name", Some(name), 64)?;
    }
    member.updated_at = now();
    self.save(member).await
  }

  pub async fn set_role(&self, viewer: &Viewer, id: Uuid, role: Role) -> Result<Member> {
    let actor = self.require_staff(viewer, Role::Administrator).await?;
    if actor.member_id == id {
      return Err(Error::validation("administrators cannot change their own role"));
    }
    let mut member: Member = self.load(id).await?;
    member.role = role;
    member.updated_at = now();
    let member = self.save(member).await?;
    info!(member_id = %id, role = role.as_str(), by = %actor.member_id, "role changed");
    Ok(member)
  }

  // ─── Categories ────────────────────────────────────────────────────────────

  async fn ensure_category_name_free(&self, name: &str, except: Option<Uuid>) -> Result<()> {
    let clash = self
      .find::<Category>(Predicate::new().eq_ignore_case("name", Some(name)))
      .await?;
    match clash {
      Some(c) if Some(c.category_id) != except => {
        Err(Error::Conflict(format!("category {name:?} already exists")))
      }
      _ => Ok(()),
    }
  }

  pub async fn create_category(
    &self,
    viewer: &Viewer,
    input: NewCategory,
  ) -> Result<Category> {
    self.require_staff(viewer, Role::Administrator).await?;
    let (name, description) = input.validate()?;
    self.ensure_category_name_free(&name, None).await?;

    let at = now();
    let category = self
      .insert(Category {
        category_id: Uuid::new_v4(),
        name,
        description,
        is_active: true,
        created_at: at,
        updated_at: at,
        deleted_at: None,
      })
      .await?;
    info!(category_id = %category.category_id, name = %category.name, "category created");
    Ok(category)
  }

  pub async fn get_category(&self, viewer: &Viewer, id: Uuid) -> Result<Category> {
    let category: Category = self.load(id).await?;
    let hidden = !viewer.sees(category.deleted_at)
      || (!category.is_active && !viewer.is_elevated());
    if hidden {
      return Err(Error::not_found::<Category>(id));
    }
    Ok(category)
  }

  pub async fn search_categories(
    &self,
    viewer: &Viewer,
    search: &CategorySearch,
  ) -> Result<Paginated<Category>> {
    self.list(search.to_query(viewer)?).await
  }

  pub async fn update_category(
    &self,
    viewer: &Viewer,
    id: Uuid,
    patch: CategoryPatch,
  ) -> Result<Category> {
    self.require_staff(viewer, Role::Administrator).await?;
    let mut category: Category = self.load(id).await?;

    if let Some(name) = patch.name.as_deref() {
      let name = validate::text("name", name, 80)?;
      self.ensure_category_name_free(&name, Some(id)).await?;
      category.name = name;
    }
    if let Some(description) = patch.description.as_deref() {
      category.description =
        validate::optional_text("description", Some(description), 1000)?;
    }
    if let Some(active) = patch.is_active {
      category.is_active = active;
    }
    category.updated_at = now();
    self.save(category).await
  }

  pub async fn delete_category(&self, viewer: &Viewer, id: Uuid) -> Result<Category> {
    self.require_staff(viewer, Role::Administrator).await?;
    let mut category: Category = self.load(id).await?;
    if category.deleted_at.is_some() {
      return Ok(category);
    }
    let at = now();
    category.deleted_at = Some(at);
    category.updated_at = at;
    let category = self.save(category).await?;
    info!(category_id = %id, "category deleted");
    Ok(category)
  }

  // ─── Tags ──────────────────────────────────────────────────────────────────

  pub async fn create_tag(&self, viewer: &Viewer, input: NewTag) -> Result<Tag> {
    self.require_staff(viewer, Role::Moderator).await?;
    let name = normalize_tag(&input.name)?;
    let clash = self
      .find::<Tag>(Predicate::new().eq_ignore_case("name", Some(name.as_str())))
      .await?;
    if clash.is_some() {
      return Err(Error::Conflict(format!("tag {name:?} already exists")));
    }
    let tag = self
      .insert(Tag { tag_id: Uuid::new_v4(), name, created_at: now() })
      .await?;
    info!(tag_id = %tag.tag_id, name = %tag.name, "tag created");
    Ok(tag)
  }

  pub async fn get_tag(&self, id: Uuid) -> Result<Tag> { self.load(id).await }

  pub async fn search_tags(&self, search: &TagSearch) -> Result<Paginated<Tag>> {
    self.list(search.to_query()?).await
  }

  /// Create any of `names` (already normalised) that do not exist yet.
  async fn ensure_tags(&self, names: &[String]) -> Result<()> {
    for name in names {
      let existing = self
        .find::<Tag>(Predicate::new().eq("name", Some(name.as_str())))
        .await?;
      if existing.is_some() {
        continue;
      }
      let tag = Tag { tag_id: Uuid::new_v4(), name: name.clone(), created_at: now() };
      match self.insert(tag).await {
        // Lost a race with a concurrent writer; the tag exists either way.
        Ok(_) | Err(Error::Conflict(_)) => {}
        Err(e) => return Err(e),
      }
    }
    Ok(())
  }

  // ─── Topics ────────────────────────────────────────────────────────────────

  /// Load a topic, treating soft-deleted ones as absent for non-elevated
  /// viewers.
  async fn visible_topic(&self, viewer: &Viewer, id: Uuid) -> Result<Topic> {
    let topic: Topic = self.load(id).await?;
    if !viewer.sees(topic.deleted_at) {
      return Err(Error::not_found::<Topic>(id));
    }
    Ok(topic)
  }

  pub async fn create_topic(&self, viewer: &Viewer, input: NewTopic) -> Result<Topic> {
    let actor = self.require_poster(viewer).await?;
    let (title, body) = input.validate()?;

    let category: Category = self.load(input.category_id).await?;
    if category.deleted_at.is_some() || !category.is_active {
      return Err(Error::validation("category is not accepting topics"));
    }

    let tags = normalize_tags(&input.tags)?;
    self.ensure_tags(&tags).await?;

    let at = now();
    let topic = self
      .insert(Topic {
        topic_id: Uuid::new_v4(),
        category_id: category.category_id,
        author_id: actor.member_id,
        title,
        body,
        status: TopicStatus::Open,
        tags,
        reply_count: 0,
        created_at: at,
        updated_at: at,
        deleted_at: None,
      })
      .await?;
    info!(topic_id = %topic.topic_id, author_id = %actor.member_id, "topic created");
    Ok(topic)
  }

  pub async fn get_topic(&self, viewer: &Viewer, id: Uuid) -> Result<Topic> {
    self.visible_topic(viewer, id).await
  }

  pub async fn search_topics(
    &self,
    viewer: &Viewer,
    search: &TopicSearch,
  ) -> Result<Paginated<Topic>> {
    self.list(search.to_query(viewer)?).await
  }

  pub async fn update_topic(
    &self,
    viewer: &Viewer,
    id: Uuid,
    patch: TopicPatch,
  ) -> Result<Topic> {
    let actor = self.current_actor(viewer).await?;
    let mut topic = self.visible_topic(viewer, id).await?;
    if !actor.can_edit(topic.author_id) {
      return Err(Error::forbidden("only the author may edit this topic"));
    }

    if let Some(title) = patch.title.as_deref() {
      topic.title = validate::text("title", title, MAX_TITLE)?;
    }
    if let Some(body) = patch.body.as_deref() {
      topic.body = validate::text("body", body, MAX_BODY)?;
    }
    if let Some(raw) = patch.tags.as_deref() {
      let tags = normalize_tags(raw)?;
      self.ensure_tags(&tags).await?;
      topic.tags = tags;
    }
    if let Some(status) = patch.status {
      if !actor.role.is_elevated() {
        return Err(Error::forbidden("only moderators may change topic status"));
      }
      topic.status = status;
    }
    topic.updated_at = now();
    self.save(topic).await
  }

  pub async fn delete_topic(&self, viewer: &Viewer, id: Uuid) -> Result<Topic> {
    let actor = self.current_actor(viewer).await?;
    let mut topic = self.visible_topic(viewer, id).await?;
    if !actor.can_edit(topic.author_id) {
      return Err(Error::forbidden("only the author may delete this topic"));
    }
    if topic.deleted_at.is_some() {
      return Ok(topic);
    }
    let at = now();
    topic.deleted_at = Some(at);
    topic.updated_at = at;
    let topic = self.save(topic).await?;
    info!(topic_id = %id, "topic deleted");
    Ok(topic)
  }

  async fn adjust_reply_count(&self, topic_id: Uuid, delta: i64) -> Result<()> {
    let mut topic: Topic = self.load(topic_id).await?;
    topic.reply_count = (topic.reply_count + delta).max(0);
    self.save(topic).await?;
    Ok(())
  }

  // ─── Replies ───────────────────────────────────────────────────────────────

  pub async fn create_reply(
    &self,
    viewer: &Viewer,
    topic_id: Uuid,
    input: NewReply,
  ) -> Result<Reply> {
    let actor = self.require_poster(viewer).await?;
    let mut topic = self.visible_topic(viewer, topic_id).await?;
    if topic.deleted_at.is_some() {
      return Err(Error::validation("cannot reply to a deleted topic"));
    }
    if topic.status == TopicStatus::Locked && !actor.role.is_elevated() {
      return Err(Error::forbidden("topic is locked"));
    }
    let body = validate::text("body", &input.body, MAX_BODY)?;

    let at = now();
    let reply = self
      .insert(Reply {
        reply_id: Uuid::new_v4(),
        topic_id,
        author_id: actor.member_id,
        body,
        created_at: at,
        updated_at: at,
        deleted_at: None,
      })
      .await?;

    topic.reply_count += 1;
    topic.updated_at = at;
    self.save(topic).await?;

    info!(reply_id = %reply.reply_id, topic_id = %topic_id, "reply created");
    Ok(reply)
  }

  /// Fetch a reply through its topic. A reply that exists but belongs to a
  /// different topic is reported as not found.
  pub async fn get_reply(
    &self,
    viewer: &Viewer,
    topic_id: Uuid,
    reply_id: Uuid,
  ) -> Result<Reply> {
    self.visible_topic(viewer, topic_id).await?;
    let reply: Reply = self.load(reply_id).await?;
    if reply.topic_id != topic_id || !viewer.sees(reply.deleted_at) {
      return Err(Error::not_found::<Reply>(reply_id));
    }
    Ok(reply)
  }

  pub async fn search_replies(
    &self,
    viewer: &Viewer,
    topic_id: Uuid,
    search: &ReplySearch,
  ) -> Result<Paginated<Reply>> {
    self.visible_topic(viewer, topic_id).await?;
    self.list(search.to_query(viewer, topic_id)?).await
  }

  pub async fn update_reply(
    &self,
    viewer: &Viewer,
    topic_id: Uuid,
    reply_id: Uuid,
    patch: ReplyPatch,
  ) -> Result<Reply> {
    let actor = self.current_actor(viewer).await?;
    let mut reply = self.get_reply(viewer, topic_id, reply_id).await?;
    if !actor.can_edit(reply.author_id) {
      return Err(Error::forbidden("only the author may edit this reply"));
    }
    if let Some(body) = patch.body.as_deref() {
      reply.body = validate::text("body", body, MAX_BODY)?;
    }
    reply.updated_at = now();
    self.save(reply).await
  }

  pub async fn delete_reply(
    &self,
    viewer: &Viewer,
    topic_id: Uuid,
    reply_id: Uuid,
  ) -> Result<Reply> {
    let actor = self.current_actor(viewer).await?;
    let mut reply = self.get_reply(viewer, topic_id, reply_id).await?;
    if !actor.can_edit(reply.author_id) {
      return Err(Error::forbidden("only the author may delete this reply"));
    }
    if reply.deleted_at.is_some() {
      return Ok(reply);
    }
    let at = now();
    reply.deleted_at = Some(at);
    reply.updated_at = at;
    let reply = self.save(reply).await?;
    self.adjust_reply_count(topic_id, -1).await?;
    info!(reply_id = %reply_id, topic_id = %topic_id, "reply deleted");
    Ok(reply)
  }

  // ─── Reports ───────────────────────────────────────────────────────────────

  pub async fn create_report(&self, viewer: &Viewer, input: NewReport) -> Result<Report> {
    let actor = self.require_poster(viewer).await?;
    let reason = validate::text("reason", &input.reason, 1000)?;

    match input.target_kind {
      TargetKind::Topic => {
        self.visible_topic(viewer, input.target_id).await?;
      }
      TargetKind::Reply => {
        let reply: Reply = self.load(input.target_id).await?;
        if !viewer.sees(reply.deleted_at) {
          return Err(Error::not_found::<Reply>(input.target_id));
        }
      }
    }

    let duplicate = self
      .find::<Report>(
        Predicate::new()
          .eq("reporter_id", Some(actor.member_id))
          .eq("target_id", Some(input.target_id))
          .eq("status", Some(ReportStatus::Pending.as_str())),
      )
      .await?;
    if duplicate.is_some() {
      return Err(Error::Conflict(
        "you already have a pending report on this content".into(),
      ));
    }

    let at = now();
    let report = self
      .insert(Report {
        report_id: Uuid::new_v4(),
        reporter_id: actor.member_id,
        target_kind: input.target_kind,
        target_id: input.target_id,
        reason,
        status: ReportStatus::Pending,
        resolved_by: None,
        created_at: at,
        updated_at: at,
      })
      .await?;
    info!(
      report_id = %report.report_id,
      target = report.target_kind.as_str(),
      target_id = %report.target_id,
      "report filed"
    );
    Ok(report)
  }

  pub async fn get_report(&self, viewer: &Viewer, id: Uuid) -> Result<Report> {
    let actor = viewer.actor()?;
    let report: Report = self.load(id).await?;
    if report.reporter_id != actor.member_id && !actor.role.is_elevated() {
      return Err(Error::forbidden("not your report"));
    }
    Ok(report)
  }

  pub async fn search_reports(
    &self,
    viewer: &Viewer,
    search: &ReportSearch,
  ) -> Result<Paginated<Report>> {
    self.require_staff(viewer, Role::Moderator).await?;
    self.list(search.to_query()?).await
  }

  // ─── Moderation ────────────────────────────────────────────────────────────

  /// Soft-delete (`hidden`) or restore a topic or reply. No-op when the
  /// target is already in the requested state.
  async fn set_hidden(&self, kind: TargetKind, id: Uuid, hidden: bool) -> Result<()> {
    let at = now();
    match kind {
      TargetKind::Topic => {
        let mut topic: Topic = self.load(id).await?;
        if topic.deleted_at.is_some() == hidden {
          return Ok(());
        }
        topic.deleted_at = hidden.then_some(at);
        topic.updated_at = at;
        self.save(topic).await?;
      }
      TargetKind::Reply => {
        let mut reply: Reply = self.load(id).await?;
        if reply.deleted_at.is_some() == hidden {
          return Ok(());
        }
        reply.deleted_at = hidden.then_some(at);
        reply.updated_at = at;
        let reply = self.save(reply).await?;
        self
          .adjust_reply_count(reply.topic_id, if hidden { -1 } else { 1 })
          .await?;
      }
    }
    Ok(())
  }

  async fn set_topic_status(&self, id: Uuid, status: TopicStatus) -> Result<()> {
    let mut topic: Topic = self.load(id).await?;
    topic.status = status;
    topic.updated_at = now();
    self.save(topic).await?;
    Ok(())
  }

  /// Apply a moderation action and record it. When the action references a
  /// pending report, the report is closed: dismissed for
  /// [`ActionKind::Dismiss`], resolved otherwise.
  pub async fn moderate(
    &self,
    viewer: &Viewer,
    input: NewAction,
  ) -> Result<ModerationAction> {
    let actor = self.require_staff(viewer, Role::Moderator).await?;
    let note = validate::optional_text("note", input.note.as_deref(), 1000)?;

    let report = match input.report_id {
      Some(id) => Some(self.load::<Report>(id).await?),
      None => None,
    };

    let (target_kind, target_id) = match (&report, input.target_kind, input.target_id) {
      (Some(r), kind, id) => {
        if kind.is_some_and(|k| k != r.target_kind) || id.is_some_and(|i| i != r.target_id) {
          return Err(Error::validation("target does not match the report"));
        }
        (r.target_kind, r.target_id)
      }
      (None, Some(kind), Some(id)) => (kind, id),
      (None, ..) => {
        return Err(Error::validation("an action needs a report_id or a target"));
      }
    };

    if let Some(r) = &report
      && r.status != ReportStatus::Pending
    {
      return Err(Error::Conflict(format!("report {} is already closed", r.report_id)));
    }

    match input.kind {
      ActionKind::Hide => self.set_hidden(target_kind, target_id, true).await?,
      ActionKind::Restore => self.set_hidden(target_kind, target_id, false).await?,
      ActionKind::Lock | ActionKind::Unlock => {
        if target_kind != TargetKind::Topic {
          return Err(Error::validation("only topics can be locked"));
        }
        let status = if input.kind == ActionKind::Lock {
          TopicStatus::Locked
        } else {
          TopicStatus::Open
        };
        self.set_topic_status(target_id, status).await?;
      }
      ActionKind::Dismiss => {
        if report.is_none() {
          return Err(Error::validation("dismiss requires a report_id"));
        }
      }
    }

    let at = now();
    if let Some(mut r) = report {
      r.status = if input.kind == ActionKind::Dismiss {
        ReportStatus::Dismissed
      } else {
        ReportStatus::Resolved
      };
      r.resolved_by = Some(actor.member_id);
      r.updated_at = at;
      self.save(r).await?;
    }

    let action = self
      .insert(ModerationAction {
        action_id: Uuid::new_v4(),
        moderator_id: actor.member_id,
        report_id: input.report_id,
        kind: input.kind,
        target_kind,
        target_id,
        note,
        created_at: at,
      })
      .await?;
    info!(
      action_id = %action.action_id,
      kind = action.kind.as_str(),
      target_id = %target_id,
      moderator_id = %actor.member_id,
      "moderation action recorded"
    );
    Ok(action)
  }

  pub async fn search_actions(
    &self,
    viewer: &Viewer,
    search: &ActionSearch,
  ) -> Result<Paginated<ModerationAction>> {
    self.require_staff(viewer, Role::Moderator).await?;
    self.list(search.to_query()?).await
  }

  // ─── Suspensions ───────────────────────────────────────────────────────────

  pub async fn suspend_member(
    &self,
    viewer: &Viewer,
    input: NewSuspension,
  ) -> Result<Suspension> {
    let actor = self.require_staff(viewer, Role::Moderator).await?;
    let reason = validate::text("reason", &input.reason, 1000)?;
    let mut member: Member = self.load(input.member_id).await?;

    if member.member_id == actor.member_id {
      return Err(Error::validation("cannot suspend yourself"));
    }
    if member.role >= actor.role {
      return Err(Error::forbidden(
        "cannot suspend a member with an equal or higher role",
      ));
    }
    let at = now();
    if input.ends_at.is_some_and(|end| end <= at) {
      return Err(Error::validation("ends_at must be in the future"));
    }

    let suspension = self
      .insert(Suspension {
        suspension_id: Uuid::new_v4(),
        member_id: member.member_id,
        moderator_id: actor.member_id,
        reason,
        ends_at: input.ends_at,
        lifted_at: None,
        created_at: at,
        updated_at: at,
      })
      .await?;

    if member.account_status == AccountStatus::Active {
      member.account_status = AccountStatus::Suspended;
      member.updated_at = at;
      self.save(member).await?;
    }
    info!(
      suspension_id = %suspension.suspension_id,
      member_id = %suspension.member_id,
      "member suspended"
    );
    Ok(suspension)
  }

  pub async fn lift_suspension(&self, viewer: &Viewer, id: Uuid) -> Result<Suspension> {
    let actor = self.require_staff(viewer, Role::Moderator).await?;
    let mut suspension: Suspension = self.load(id).await?;
    if suspension.lifted_at.is_some() {
      return Err(Error::Conflict(format!("suspension {id} is already lifted")));
    }
    let at = now();
    suspension.lifted_at = Some(at);
    suspension.updated_at = at;
    let suspension = self.save(suspension).await?;

    let still_active = self
      .count::<Suspension>(active_suspensions(suspension.member_id, at))
      .await?;
    let mut member: Member = self.load(suspension.member_id).await?;
    if still_active == 0 && member.account_status == AccountStatus::Suspended {
      member.account_status = AccountStatus::Active;
      member.updated_at = at;
      self.save(member).await?;
    }
    info!(suspension_id = %id, by = %actor.member_id, "suspension lifted");
    Ok(suspension)
  }

  pub async fn search_suspensions(
    &self,
    viewer: &Viewer,
    search: &SuspensionSearch,
  ) -> Result<Paginated<Suspension>> {
    self.require_staff(viewer, Role::Moderator).await?;
    self.list(search.to_query()?).await
  }
}
