//! Transaction helpers for the projects domain
//!
//! The create/clone/import flows write a whole aggregate in one fixed
//! order: project, activity entry, organizing participation, follow
//! relationship, description page, signup record, and finally the
//! publish stamp. [`create_project_graph`] is the single owner of that
//! sequence; the publish stamp runs only after every prior write
//! succeeded, and the surrounding transaction makes the sequence
//! all-or-nothing.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use peerhub_auth::Profile;
use peerhub_common::{Error, Result};

use crate::domain::entities::{
    Activity, ActivityVerb, Link, Page, Participation, Project, ProjectKind, Signup, SignupPolicy,
    FULL_DESCRIPTION_SLUG, FULL_DESCRIPTION_TITLE,
};
use crate::repository::links::LINK_COLUMNS;
use crate::repository::pages::PAGE_COLUMNS;
use crate::repository::participations::PARTICIPATION_COLUMNS;
use crate::repository::projects::PROJECT_COLUMNS;
use crate::repository::relationships::RELATIONSHIP_COLUMNS;
use crate::repository::signups::SIGNUP_COLUMNS;

/// Everything needed to materialize a new project aggregate.
#[derive(Debug, Clone)]
pub struct NewProjectGraph {
    pub project: Project,
    pub detailed_description_content: String,
    pub signup_policy: SignupPolicy,
    /// (title, content) pairs, in display order
    pub tasks: Vec<(String, String)>,
    /// (name, url) pairs, in display order
    pub links: Vec<(String, String)>,
}

/// Create a project within a transaction
pub async fn create_project_tx(
    tx: &mut Transaction<'_, Postgres>,
    project: &Project,
) -> Result<Project> {
    let query = format!(
        "INSERT INTO projects ({PROJECT_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) \
         RETURNING {PROJECT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Project>(&query)
        .bind(project.id)
        .bind(&project.slug)
        .bind(project.kind)
        .bind(&project.name)
        .bind(&project.short_description)
        .bind(&project.long_description)
        .bind(&project.image_path)
        .bind(project.school_id)
        .bind(project.detailed_description_id)
        .bind(project.clone_of)
        .bind(&project.imported_from)
        .bind(project.listed)
        .bind(project.under_development)
        .bind(project.signup_closed)
        .bind(project.start_date)
        .bind(project.end_date)
        .bind(project.published_at)
        .bind(project.created_at)
        .bind(project.updated_at)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Create an activity-feed entry within a transaction
pub async fn create_activity_tx(
    tx: &mut Transaction<'_, Postgres>,
    activity: &Activity,
) -> Result<Activity> {
    let row = sqlx::query_as::<_, Activity>(
        "INSERT INTO activities (id, actor_id, verb, project_id, created_at) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, actor_id, verb, project_id, created_at",
    )
    .bind(activity.id)
    .bind(activity.actor_id)
    .bind(activity.verb)
    .bind(activity.project_id)
    .bind(activity.created_at)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row)
}

/// Create a participation within a transaction
pub async fn create_participation_tx(
    tx: &mut Transaction<'_, Postgres>,
    participation: &Participation,
) -> Result<Participation> {
    let query = format!(
        "INSERT INTO participations ({PARTICIPATION_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {PARTICIPATION_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Participation>(&query)
        .bind(participation.id)
        .bind(participation.project_id)
        .bind(participation.user_id)
        .bind(participation.organizing)
        .bind(participation.status)
        .bind(participation.joined_at)
        .bind(participation.left_at)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Get-or-create the follow relationship and force it active, within a
/// transaction
pub async fn upsert_relationship_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    project_id: Uuid,
) -> Result<()> {
    let relationship = crate::domain::entities::Relationship::new(user_id, project_id);
    let query = format!(
        "INSERT INTO relationships ({RELATIONSHIP_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (source_user_id, target_project_id) \
         DO UPDATE SET status = 'active', ended_at = NULL"
    );
    sqlx::query(&query)
        .bind(relationship.id)
        .bind(relationship.source_user_id)
        .bind(relationship.target_project_id)
        .bind(relationship.status)
        .bind(relationship.created_at)
        .bind(relationship.ended_at)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Create a page within a transaction
pub async fn create_page_tx(tx: &mut Transaction<'_, Postgres>, page: &Page) -> Result<Page> {
    let query = format!(
        "INSERT INTO pages ({PAGE_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
         RETURNING {PAGE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Page>(&query)
        .bind(page.id)
        .bind(page.project_id)
        .bind(page.author_id)
        .bind(&page.title)
        .bind(&page.slug)
        .bind(&page.content)
        .bind(page.index)
        .bind(page.listed)
        .bind(page.collaborative)
        .bind(page.status)
        .bind(page.deleted_at)
        .bind(page.created_at)
        .bind(page.updated_at)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Point a project at its description page within a transaction
pub async fn set_detailed_description_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    page_id: Uuid,
) -> Result<()> {
    sqlx::query("UPDATE projects SET detailed_description_id = $2, updated_at = NOW() WHERE id = $1")
        .bind(project_id)
        .bind(page_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Create the signup record within a transaction
pub async fn create_signup_tx(tx: &mut Transaction<'_, Postgres>, signup: &Signup) -> Result<Signup> {
    let query = format!(
        "INSERT INTO signups ({SIGNUP_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {SIGNUP_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Signup>(&query)
        .bind(signup.id)
        .bind(signup.project_id)
        .bind(signup.author_id)
        .bind(signup.policy)
        .bind(signup.created_at)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Create a link within a transaction, appending to the curation order
pub async fn create_link_tx(tx: &mut Transaction<'_, Postgres>, link: &Link) -> Result<Link> {
    let query = format!(
        "INSERT INTO links (id, project_id, user_id, name, url, index, subscription_id, created_at) \
         VALUES ($1, $2, $3, $4, $5, \
                 (SELECT COALESCE(MAX(index), 0) + 1 FROM links WHERE project_id = $2), \
                 $6, $7) \
         RETURNING {LINK_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Link>(&query)
        .bind(link.id)
        .bind(link.project_id)
        .bind(link.user_id)
        .bind(&link.name)
        .bind(&link.url)
        .bind(link.subscription_id)
        .bind(link.created_at)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// The publish hook: stamp the project as published
pub async fn publish_project_tx(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
) -> Result<Project> {
    let query = format!(
        "UPDATE projects SET published_at = NOW(), updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {PROJECT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Project>(&query)
        .bind(project_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(row)
}

/// Materialize a full project aggregate in the fixed creation order.
///
/// Shared by create, clone and import; only the graph contents differ.
pub async fn create_project_graph(
    tx: &mut Transaction<'_, Postgres>,
    actor: &Profile,
    graph: NewProjectGraph,
) -> Result<Project> {
    let project = create_project_tx(tx, &graph.project).await?;

    create_activity_tx(tx, &Activity::new(actor.id, ActivityVerb::Post, project.id)).await?;

    create_participation_tx(tx, &Participation::new(project.id, actor.id, true)).await?;

    upsert_relationship_tx(tx, actor.id, project.id).await?;

    let mut description = Page::new(
        project.id,
        actor.id,
        FULL_DESCRIPTION_TITLE.to_string(),
        FULL_DESCRIPTION_SLUG.to_string(),
        graph.detailed_description_content,
    )?;
    description.listed = false;
    description.collaborative = project.kind == ProjectKind::StudyGroup;
    let description = create_page_tx(tx, &description).await?;
    set_detailed_description_tx(tx, project.id, description.id).await?;

    create_signup_tx(tx, &Signup::new(project.id, actor.id, graph.signup_policy)).await?;

    for (position, (title, content)) in graph.tasks.into_iter().enumerate() {
        let slug = task_slug(&title, position)?;
        let mut task = Page::new(project.id, actor.id, title, slug, content)?;
        task.index = position as i32;
        create_page_tx(tx, &task).await?;
    }

    for (name, url) in graph.links {
        let link = Link::new(project.id, actor.id, name, url)?;
        create_link_tx(tx, &link).await?;
    }

    // Publish only after every prior write succeeded
    publish_project_tx(tx, project.id).await
}

/// Slug for an imported or cloned task page, unique within the project.
fn task_slug(title: &str, position: usize) -> Result<String> {
    let base: String = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    let mut slug = String::with_capacity(base.len());
    let mut prev_hyphen = false;
    for ch in base.chars() {
        if ch == '-' {
            if !prev_hyphen {
                slug.push(ch);
            }
            prev_hyphen = true;
        } else {
            slug.push(ch);
            prev_hyphen = false;
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        return Err(Error::Validation(format!(
            "Cannot derive a task slug from title {:?}",
            title
        )));
    }
    Ok(format!("{}-{}", slug, position + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_slug_from_title() {
        assert_eq!(task_slug("Week 1: Reading", 0).unwrap(), "week-1-reading-1");
        assert_eq!(task_slug("Ship it!", 4).unwrap(), "ship-it-5");
    }

    #[test]
    fn test_task_slug_rejects_symbol_only_titles() {
        assert!(task_slug("!!!", 0).is_err());
    }

    #[test]
    fn test_task_slug_collapses_hyphens() {
        let slug = task_slug("a -- b", 0).unwrap();
        assert!(!slug.contains("--"));
    }
}
