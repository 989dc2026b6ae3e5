use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::store::{MilestoneStatus, Priority, ProjectStatus};
use crate::tracker::completion_of;

use super::app::{App, Focus, InputMode};

pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    // Title bar
    let title = Line::from(vec![
        Span::styled(
            " timeline ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            app.config.format_date(app.today),
            Style::default().fg(Color::White),
        ),
        Span::raw("    "),
        Span::styled(
            "Tab:focus  t:toggle  s:status  d:delete  r:refresh  q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(title), outer[0]);

    draw_summary(frame, app, outer[1]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(outer[2]);

    draw_projects(frame, app, main[0]);
    draw_milestones(frame, app, main[1]);

    // Status bar
    let status = if app.input_mode == InputMode::ConfirmDelete {
        let target = app
            .confirm_target
            .as_ref()
            .map(|t| t.describe())
            .unwrap_or_default();
        Line::from(vec![
            Span::styled(
                format!(" Delete {target}? "),
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("(y/n)", Style::default().fg(Color::DarkGray)),
        ])
    } else if !app.status_message.is_empty() {
        Line::from(Span::styled(
            format!(" {}", app.status_message),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from(Span::styled(
            " j/k:navigate",
            Style::default().fg(Color::DarkGray),
        ))
    };
    frame.render_widget(Paragraph::new(status), outer[3]);
}

fn draw_summary(frame: &mut Frame, app: &App, area: Rect) {
    let s = &app.summary;
    let label = Style::default().fg(Color::DarkGray);
    let line = Line::from(vec![
        Span::styled(" Projects: ", label),
        Span::styled(s.total_projects.to_string(), Style::default().fg(Color::White)),
        Span::styled("  Active: ", label),
        Span::styled(s.active_projects.to_string(), Style::default().fg(Color::Green)),
        Span::styled("  Overdue: ", label),
        Span::styled(s.overdue_projects.to_string(), Style::default().fg(Color::Red)),
        Span::styled("  Milestones done: ", label),
        Span::styled(
            s.completed_milestones.to_string(),
            Style::default().fg(Color::Blue),
        ),
        Span::styled("  pending: ", label),
        Span::styled(
            s.pending_milestones.to_string(),
            Style::default().fg(Color::Yellow),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn project_status_style(status: ProjectStatus) -> Style {
    match status {
        ProjectStatus::InProgress => Style::default().fg(Color::Green),
        ProjectStatus::Overdue => Style::default().fg(Color::Red),
        ProjectStatus::Completed => Style::default().fg(Color::Blue),
        ProjectStatus::NotStarted | ProjectStatus::NotCompleted => {
            Style::default().fg(Color::DarkGray)
        }
    }
}

fn milestone_status_style(status: MilestoneStatus) -> Style {
    match status {
        MilestoneStatus::InProgress => Style::default().fg(Color::Green),
        MilestoneStatus::Overdue => Style::default().fg(Color::Red),
        MilestoneStatus::Completed => Style::default().fg(Color::Blue),
        MilestoneStatus::NotStarted => Style::default().fg(Color::DarkGray),
    }
}

fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::DarkGray),
    }
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_projects(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Projects ")
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Projects));

    if app.projects.is_empty() {
        let msg = Paragraph::new("  No projects yet.\n  Use `timeline add-project`")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let items: Vec<ListItem> = app
        .projects
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let project = &entry.project;
            let selected = i == app.project_index;
            let status_style = project_status_style(project.status);
            let completion = completion_of(entry.milestones.iter().map(|m| m.status));

            let mut spans = vec![];

            // Selection indicator
            if selected {
                spans.push(Span::styled("▸ ", Style::default().fg(Color::Cyan)));
            } else {
                spans.push(Span::raw("  "));
            }

            spans.push(Span::styled(project.status.symbol(), status_style));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                &project.project_name,
                if selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                },
            ));
            spans.push(Span::styled(
                format!(" ({})", project.client_name),
                Style::default().fg(Color::DarkGray),
            ));

            let dates = Line::from(vec![
                Span::raw("    "),
                Span::styled(
                    format!(
                        "{} → {}",
                        app.config.format_date(project.start_date),
                        app.config.format_date(project.end_date)
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw("  "),
                Span::styled(format!("{completion}%"), status_style),
            ]);

            ListItem::new(vec![Line::from(spans), dates])
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

fn draw_milestones(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Milestones ")
        .borders(Borders::ALL)
        .border_style(border_style(app.focus == Focus::Milestones));

    let Some(detail) = app.detail.as_ref() else {
        let msg = Paragraph::new("  Select a project")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(msg, area);
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let project = &detail.project;
    let header = vec![
        Line::from(vec![
            Span::styled(
                format!(" {}", project.project_name),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(project.status.label(), project_status_style(project.status)),
        ]),
        Line::from(Span::styled(
            format!(
                " {}/{} completed ({}%)",
                detail.completed_milestones,
                detail.milestones.len(),
                detail.completion_percentage
            ),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(header), parts[0]);

    if detail.milestones.is_empty() {
        let msg = Paragraph::new("  No milestones.\n  Use `timeline add-milestone`")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(msg, parts[1]);
        return;
    }

    let focused = app.focus == Focus::Milestones;
    let items: Vec<ListItem> = detail
        .milestones
        .iter()
        .enumerate()
        .map(|(i, milestone)| {
            let selected = focused && i == app.milestone_index;
            let status_style = milestone_status_style(milestone.status);

            let prefix = if selected {
                Span::styled("▸ ", Style::default().fg(Color::Cyan))
            } else {
                Span::raw("  ")
            };

            let name_style = if selected {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(Line::from(vec![
                prefix,
                Span::styled(milestone.status.symbol(), status_style),
                Span::raw(" "),
                Span::styled(&milestone.milestone_name, name_style),
                Span::raw("  "),
                Span::styled(
                    format!(
                        "{} → {}",
                        app.config.format_date(milestone.start_date),
                        app.config.format_date(milestone.end_date)
                    ),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw("  "),
                Span::styled(milestone.status.label(), status_style),
                Span::raw("  "),
                Span::styled(milestone.priority.label(), priority_style(milestone.priority)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items), parts[1]);
}
