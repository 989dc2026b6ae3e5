use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{OptionalExtension, Row, params};

use super::Store;
use super::models::{Milestone, MilestoneStatus, Priority, Project, ProjectStatus};

const PROJECT_COLUMNS: &str =
    "id, project_name, client_name, start_date, end_date, status, created_at";

const MILESTONE_COLUMNS: &str =
    "id, project_id, milestone_name, start_date, end_date, status, priority";

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    let status_str: String = row.get(5)?;
    Ok(Project {
        id: row.get(0)?,
        project_name: row.get(1)?,
        client_name: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        status: ProjectStatus::from_str(&status_str),
        created_at: row.get(6)?,
    })
}

fn milestone_from_row(row: &Row<'_>) -> rusqlite::Result<Milestone> {
    let status_str: String = row.get(5)?;
    let priority_str: String = row.get(6)?;
    Ok(Milestone {
        id: row.get(0)?,
        project_id: row.get(1)?,
        milestone_name: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        status: MilestoneStatus::from_str(&status_str),
        priority: Priority::from_str(&priority_str),
    })
}

/// Build a `LIKE` pattern matching everything that starts with `term`.
fn prefix_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 1);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Store {
    // ── Projects ──

    pub fn create_project(
        &self,
        project_name: &str,
        client_name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Project> {
        self.conn.execute(
            "INSERT INTO projects (project_name, client_name, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![project_name, client_name, start_date, end_date],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_project(id)?
            .with_context(|| format!("project {id} missing after insert"))
    }

    pub fn get_project(&self, id: i64) -> Result<Option<Project>> {
        let project = self
            .conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
                params![id],
                project_from_row,
            )
            .optional()?;
        Ok(project)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY start_date, id"
        ))?;
        let projects = stmt
            .query_map([], project_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    /// Projects whose date range intersects `[start, end]`.
    pub fn list_projects_overlapping(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects
             WHERE start_date <= ?2 AND end_date >= ?1
             ORDER BY start_date, id"
        ))?;
        let projects = stmt
            .query_map(params![start, end], project_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(projects)
    }

    pub fn find_project_by_name(&self, project_name: &str) -> Result<Option<Project>> {
        let project = self
            .conn
            .query_row(
                &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE project_name = ?1"),
                params![project_name],
                project_from_row,
            )
            .optional()?;
        Ok(project)
    }

    pub fn update_project(&self, project: &Project) -> Result<()> {
        self.conn.execute(
            "UPDATE projects
             SET project_name = ?1, client_name = ?2, start_date = ?3, end_date = ?4, status = ?5
             WHERE id = ?6",
            params![
                project.project_name,
                project.client_name,
                project.start_date,
                project.end_date,
                project.status.as_str(),
                project.id
            ],
        )?;
        Ok(())
    }

    pub fn update_project_status(&self, id: i64, status: ProjectStatus) -> Result<()> {
        self.conn.execute(
            "UPDATE projects SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(())
    }

    /// Delete a project and all of its milestones. Returns `false` if no
    /// project had that id.
    pub fn delete_project(&self, id: i64) -> Result<bool> {
        self.conn
            .execute("DELETE FROM milestones WHERE project_id = ?1", params![id])?;
        let deleted = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Distinct project names starting with `term`, ignoring case.
    pub fn search_project_names(&self, term: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT project_name FROM projects
             WHERE project_name LIKE ?1 ESCAPE '\\'
             ORDER BY project_name",
        )?;
        let names = stmt
            .query_map(params![prefix_pattern(term)], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Distinct client names starting with `term`, ignoring case.
    pub fn search_client_names(&self, term: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT client_name FROM projects
             WHERE client_name LIKE ?1 ESCAPE '\\'
             ORDER BY client_name",
        )?;
        let names = stmt
            .query_map(params![prefix_pattern(term)], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(names)
    }

    // ── Milestones ──

    pub fn create_milestone(
        &self,
        project_id: i64,
        milestone_name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: MilestoneStatus,
        priority: Priority,
    ) -> Result<Milestone> {
        self.conn.execute(
            "INSERT INTO milestones (project_id, milestone_name, start_date, end_date, status, priority)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                project_id,
                milestone_name,
                start_date,
                end_date,
                status.as_str(),
                priority.as_str()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_milestone(id)?
            .with_context(|| format!("milestone {id} missing after insert"))
    }

    pub fn get_milestone(&self, id: i64) -> Result<Option<Milestone>> {
        let milestone = self
            .conn
            .query_row(
                &format!("SELECT {MILESTONE_COLUMNS} FROM milestones WHERE id = ?1"),
                params![id],
                milestone_from_row,
            )
            .optional()?;
        Ok(milestone)
    }

    pub fn list_milestones_for_project(&self, project_id: i64) -> Result<Vec<Milestone>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MILESTONE_COLUMNS} FROM milestones
             WHERE project_id = ?1
             ORDER BY start_date, id"
        ))?;
        let milestones = stmt
            .query_map(params![project_id], milestone_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(milestones)
    }

    pub fn update_milestone(&self, milestone: &Milestone) -> Result<()> {
        self.conn.execute(
            "UPDATE milestones
             SET milestone_name = ?1, start_date = ?2, end_date = ?3, status = ?4, priority = ?5
             WHERE id = ?6",
            params![
                milestone.milestone_name,
                milestone.start_date,
                milestone.end_date,
                milestone.status.as_str(),
                milestone.priority.as_str(),
                milestone.id
            ],
        )?;
        Ok(())
    }

    pub fn update_milestone_status(&self, id: i64, status: MilestoneStatus) -> Result<()> {
        self.conn.execute(
            "UPDATE milestones SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id],
        )?;
        Ok(())
    }

    pub fn delete_milestone(&self, id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM milestones WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_project(store: &Store, name: &str, client: &str) -> Project {
        store
            .create_project(name, client, date("2024-01-01"), date("2024-12-31"))
            .unwrap()
    }

    #[test]
    fn test_create_and_get_project() {
        let store = Store::open_in_memory().unwrap();
        let project = sample_project(&store, "Apollo", "Nasa");
        assert_eq!(project.project_name, "Apollo");
        assert_eq!(project.client_name, "Nasa");
        assert_eq!(project.start_date, date("2024-01-01"));
        assert_eq!(project.status, ProjectStatus::NotCompleted);

        let fetched = store.get_project(project.id).unwrap().unwrap();
        assert_eq!(fetched, project);
    }

    #[test]
    fn test_get_missing_project() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get_project(42).unwrap().is_none());
    }

    #[test]
    fn test_list_projects_ordered_by_start() {
        let store = Store::open_in_memory().unwrap();
        store
            .create_project("Later", "C", date("2024-06-01"), date("2024-07-01"))
            .unwrap();
        store
            .create_project("Earlier", "C", date("2024-01-01"), date("2024-02-01"))
            .unwrap();

        let projects = store.list_projects().unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].project_name, "Earlier");
        assert_eq!(projects[1].project_name, "Later");
    }

    #[test]
    fn test_list_projects_overlapping() {
        let store = Store::open_in_memory().unwrap();
        store
            .create_project("Q1", "C", date("2024-01-01"), date("2024-03-31"))
            .unwrap();
        store
            .create_project("Q3", "C", date("2024-07-01"), date("2024-09-30"))
            .unwrap();

        let hits = store
            .list_projects_overlapping(date("2024-03-31"), date("2024-06-30"))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].project_name, "Q1");
    }

    #[test]
    fn test_update_project() {
        let store = Store::open_in_memory().unwrap();
        let mut project = sample_project(&store, "Apollo", "Nasa");
        project.client_name = "Esa".into();
        project.end_date = date("2025-01-31");
        store.update_project(&project).unwrap();

        let fetched = store.get_project(project.id).unwrap().unwrap();
        assert_eq!(fetched.client_name, "Esa");
        assert_eq!(fetched.end_date, date("2025-01-31"));
    }

    #[test]
    fn test_delete_project_cascades() {
        let store = Store::open_in_memory().unwrap();
        let project = sample_project(&store, "Doomed", "C");
        let milestone = store
            .create_milestone(
                project.id,
                "Kickoff",
                date("2024-01-01"),
                date("2024-01-31"),
                MilestoneStatus::NotStarted,
                Priority::Medium,
            )
            .unwrap();

        assert!(store.delete_project(project.id).unwrap());
        assert!(store.list_projects().unwrap().is_empty());
        assert!(store.get_milestone(milestone.id).unwrap().is_none());
        assert!(!store.delete_project(project.id).unwrap());
    }

    #[test]
    fn test_find_project_by_name() {
        let store = Store::open_in_memory().unwrap();
        let project = sample_project(&store, "Acme Corp", "Acme");
        let found = store.find_project_by_name("Acme Corp").unwrap().unwrap();
        assert_eq!(found.id, project.id);
        assert!(store.find_project_by_name("Acme").unwrap().is_none());
    }

    #[test]
    fn test_search_project_names_is_case_insensitive_prefix() {
        let store = Store::open_in_memory().unwrap();
        sample_project(&store, "Apollo", "Nasa");
        sample_project(&store, "Apex", "Nasa");
        sample_project(&store, "Gemini", "Nasa");

        let names = store.search_project_names("ap").unwrap();
        assert_eq!(names, vec!["Apex".to_string(), "Apollo".to_string()]);

        let all = store.search_project_names("").unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_search_client_names_deduplicates() {
        let store = Store::open_in_memory().unwrap();
        sample_project(&store, "Apollo", "Nasa");
        sample_project(&store, "Gemini", "Nasa");
        sample_project(&store, "Rosetta", "Esa");

        let clients = store.search_client_names("n").unwrap();
        assert_eq!(clients, vec!["Nasa".to_string()]);
    }

    #[test]
    fn test_search_escapes_wildcards() {
        let store = Store::open_in_memory().unwrap();
        sample_project(&store, "Apollo", "Nasa");
        assert!(store.search_project_names("%").unwrap().is_empty());
        assert!(store.search_project_names("_pollo").unwrap().is_empty());
    }

    #[test]
    fn test_milestone_lifecycle() {
        let store = Store::open_in_memory().unwrap();
        let project = sample_project(&store, "Apollo", "Nasa");
        let milestone = store
            .create_milestone(
                project.id,
                "Design",
                date("2024-02-01"),
                date("2024-03-01"),
                MilestoneStatus::InProgress,
                Priority::High,
            )
            .unwrap();
        assert_eq!(milestone.project_id, project.id);
        assert_eq!(milestone.status, MilestoneStatus::InProgress);
        assert_eq!(milestone.priority, Priority::High);

        store
            .update_milestone_status(milestone.id, MilestoneStatus::Completed)
            .unwrap();
        let m = store.get_milestone(milestone.id).unwrap().unwrap();
        assert_eq!(m.status, MilestoneStatus::Completed);

        let mut edited = m.clone();
        edited.milestone_name = "Detailed Design".into();
        edited.priority = Priority::Low;
        store.update_milestone(&edited).unwrap();
        let m = store.get_milestone(milestone.id).unwrap().unwrap();
        assert_eq!(m, edited);

        assert!(store.delete_milestone(milestone.id).unwrap());
        assert!(!store.delete_milestone(milestone.id).unwrap());
    }

    #[test]
    fn test_list_milestones_for_project() {
        let store = Store::open_in_memory().unwrap();
        let p1 = sample_project(&store, "P1", "C");
        let p2 = sample_project(&store, "P2", "C");

        for (project_id, name, start) in [
            (p1.id, "Second", "2024-05-01"),
            (p1.id, "First", "2024-02-01"),
            (p2.id, "Other", "2024-02-01"),
        ] {
            store
                .create_milestone(
                    project_id,
                    name,
                    date(start),
                    date("2024-06-01"),
                    MilestoneStatus::NotStarted,
                    Priority::Medium,
                )
                .unwrap();
        }

        let milestones = store.list_milestones_for_project(p1.id).unwrap();
        assert_eq!(milestones.len(), 2);
        assert_eq!(milestones[0].milestone_name, "First");
        assert_eq!(milestones[1].milestone_name, "Second");

        assert_eq!(store.list_milestones_for_project(p2.id).unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_stored_status_loads_leniently() {
        let store = Store::open_in_memory().unwrap();
        let project = sample_project(&store, "P", "C");
        let milestone = store
            .create_milestone(
                project.id,
                "M",
                date("2024-02-01"),
                date("2024-03-01"),
                MilestoneStatus::Completed,
                Priority::Medium,
            )
            .unwrap();
        store
            .conn
            .execute(
                "UPDATE milestones SET status = 'Blocked' WHERE id = ?1",
                params![milestone.id],
            )
            .unwrap();

        let m = store.get_milestone(milestone.id).unwrap().unwrap();
        assert_eq!(m.status, MilestoneStatus::NotStarted);
    }

    #[test]
    fn test_prefix_pattern() {
        assert_eq!(prefix_pattern("ab"), "ab%");
        assert_eq!(prefix_pattern("50%_"), "50\\%\\_%");
    }
}
