//! Evaluation console: drill down main event -> sub-event -> competition
//! -> team, then record judges' marks for a team.
//!
//! Marks are kept per team; recording again replaces the previous set.
//! No totals or rankings are computed.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{EvaluationMark, EventId, EventNode, Team, TeamId};
use crate::utils::contains_ignore_case;
use crate::validation::ValidationError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("No option {0} at this level")]
    UnknownOption(EventId),

    #[error("Team {0} is not in the selected competition")]
    UnknownTeam(TeamId),

    #[error("Select a team first")]
    AtTeamListOnly,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Where the drill-down currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DrillState {
    AtMainList,
    AtSubList,
    AtCompetitionList,
    AtTeamList,
}

impl DrillState {
    pub fn title(&self) -> &'static str {
        match self {
            DrillState::AtMainList => "Main Events",
            DrillState::AtSubList => "Sub-Events",
            DrillState::AtCompetitionList => "Competitions",
            DrillState::AtTeamList => "Teams",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub state: DrillState,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct EvaluationConsole {
    events: Vec<EventNode>,
    teams: HashMap<EventId, Vec<Team>>,
    main: Option<EventId>,
    sub: Option<EventId>,
    competition: Option<EventId>,
    team_filter: String,
    marks: HashMap<TeamId, Vec<EvaluationMark>>,
}

impl EvaluationConsole {
    pub fn new(events: Vec<EventNode>, teams: HashMap<EventId, Vec<Team>>) -> Self {
        Self {
            events,
            teams,
            ..Self::default()
        }
    }

    pub fn state(&self) -> DrillState {
        match (self.main, self.sub, self.competition) {
            (None, _, _) => DrillState::AtMainList,
            (Some(_), None, _) => DrillState::AtSubList,
            (Some(_), Some(_), None) => DrillState::AtCompetitionList,
            (Some(_), Some(_), Some(_)) => DrillState::AtTeamList,
        }
    }

    fn selected_main(&self) -> Option<&EventNode> {
        let id = self.main?;
        self.events.iter().find(|e| e.id == id)
    }

    fn selected_sub(&self) -> Option<&EventNode> {
        let id = self.sub?;
        self.selected_main()?.children.iter().find(|e| e.id == id)
    }

    fn selected_competition(&self) -> Option<&EventNode> {
        let id = self.competition?;
        self.selected_sub()?.children.iter().find(|e| e.id == id)
    }

    /// Options at the current event level; empty at the team list
    pub fn options(&self) -> &[EventNode] {
        match self.state() {
            DrillState::AtMainList => &self.events,
            DrillState::AtSubList => self.selected_main().map(|m| m.children.as_slice()).unwrap_or_default(),
            DrillState::AtCompetitionList => self.selected_sub().map(|s| s.children.as_slice()).unwrap_or_default(),
            DrillState::AtTeamList => &[],
        }
    }

    /// Move one level down by picking an option at the current level
    pub fn select(&mut self, id: EventId) -> Result<DrillState, EvaluationError> {
        if !self.options().iter().any(|o| o.id == id) {
            return Err(EvaluationError::UnknownOption(id));
        }
        match self.state() {
            DrillState::AtMainList => self.main = Some(id),
            DrillState::AtSubList => self.sub = Some(id),
            DrillState::AtCompetitionList => {
                self.competition = Some(id);
                self.team_filter.clear();
            }
            DrillState::AtTeamList => return Err(EvaluationError::UnknownOption(id)),
        }
        debug!(id, state = ?self.state(), "Evaluation drill-down");
        Ok(self.state())
    }

    /// Trail of the selections made so far, starting with the root list
    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let mut crumbs = vec![Breadcrumb {
            state: DrillState::AtMainList,
            label: DrillState::AtMainList.title().to_string(),
        }];
        let selected = [
            (DrillState::AtSubList, self.selected_main()),
            (DrillState::AtCompetitionList, self.selected_sub()),
            (DrillState::AtTeamList, self.selected_competition()),
        ];
        for (state, node) in selected {
            match node {
                Some(n) => crumbs.push(Breadcrumb {
                    state,
                    label: n.name.clone(),
                }),
                None => break,
            }
        }
        crumbs
    }

    /// Jump back to `state`, clearing every deeper selection
    pub fn go_to(&mut self, state: DrillState) {
        if state <= DrillState::AtMainList {
            self.main = None;
        }
        if state <= DrillState::AtSubList {
            self.sub = None;
        }
        if state <= DrillState::AtCompetitionList {
            self.competition = None;
            self.team_filter.clear();
        }
    }

    /// One step back, if not already at the top
    pub fn back(&mut self) {
        let target = match self.state() {
            DrillState::AtMainList => return,
            DrillState::AtSubList => DrillState::AtMainList,
            DrillState::AtCompetitionList => DrillState::AtSubList,
            DrillState::AtTeamList => DrillState::AtCompetitionList,
        };
        self.go_to(target);
    }

    // ===== Teams =====

    pub fn team_filter(&self) -> &str {
        &self.team_filter
    }

    pub fn set_team_filter(&mut self, filter: impl Into<String>) {
        self.team_filter = filter.into();
    }

    pub fn team_filter_mut(&mut self) -> &mut String {
        &mut self.team_filter
    }

    /// Teams of the selected competition whose name matches the filter
    pub fn filtered_teams(&self) -> Vec<&Team> {
        let Some(id) = self.competition.filter(|_| self.state() == DrillState::AtTeamList) else {
            return Vec::new();
        };
        self.teams
            .get(&id)
            .map(|teams| {
                teams
                    .iter()
                    .filter(|t| contains_ignore_case(&t.name, &self.team_filter))
                    .collect()
            })
            .unwrap_or_default()
    }

    // ===== Marks =====

    /// Record the marks for a team, replacing any earlier evaluation
    pub fn record_marks(&mut self, team_id: TeamId, marks: Vec<EvaluationMark>) -> Result<(), EvaluationError> {
        let competition = self
            .competition
            .filter(|_| self.state() == DrillState::AtTeamList)
            .ok_or(EvaluationError::AtTeamListOnly)?;
        let in_competition = self
            .teams
            .get(&competition)
            .is_some_and(|teams| teams.iter().any(|t| t.id == team_id));
        if !in_competition {
            return Err(EvaluationError::UnknownTeam(team_id));
        }
        if marks.is_empty() {
            return Err(ValidationError::Required("At least one mark").into());
        }
        for mark in &marks {
            mark.validate()?;
        }

        info!(team_id, judges = marks.len(), "Recorded evaluation");
        self.marks.insert(team_id, marks);
        Ok(())
    }

    pub fn marks_for(&self, team_id: TeamId) -> Option<&[EvaluationMark]> {
        self.marks.get(&team_id).map(Vec::as_slice)
    }

    pub fn is_evaluated(&self, team_id: TeamId) -> bool {
        self.marks.contains_key(&team_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn console() -> EvaluationConsole {
        let (events, teams) = fixtures::evaluation_hierarchy();
        EvaluationConsole::new(events, teams)
    }

    fn at_hackathon() -> EvaluationConsole {
        let mut console = console();
        console.select(1).unwrap();
        console.select(101).unwrap();
        console.select(1001).unwrap();
        console
    }

    // ===== Drill-down =====

    #[test]
    fn test_forward_selection_moves_through_states() {
        let mut console = console();
        assert_eq!(console.state(), DrillState::AtMainList);
        assert_eq!(console.options().len(), 2);

        assert_eq!(console.select(2), Ok(DrillState::AtSubList));
        assert_eq!(console.select(201), Ok(DrillState::AtCompetitionList));
        assert_eq!(console.select(2001), Ok(DrillState::AtTeamList));
        assert!(console.options().is_empty());
        assert_eq!(console.filtered_teams().len(), 1);
    }

    #[test]
    fn test_select_rejects_options_from_other_levels() {
        let mut console = console();
        assert_eq!(console.select(101), Err(EvaluationError::UnknownOption(101)));
        console.select(1).unwrap();
        assert_eq!(console.select(201), Err(EvaluationError::UnknownOption(201)));
        assert_eq!(console.state(), DrillState::AtSubList);
    }

    #[test]
    fn test_breadcrumb_clears_deeper_selections() {
        let mut console = at_hackathon();
        let labels: Vec<String> = console.breadcrumbs().into_iter().map(|b| b.label).collect();
        assert_eq!(labels, vec!["Main Events", "Anokha", "Anokha 2025", "Hackathon"]);

        console.go_to(DrillState::AtSubList);
        assert_eq!(console.state(), DrillState::AtSubList);
        assert_eq!(console.breadcrumbs().len(), 2);

        console.select(102).unwrap();
        let ids: Vec<EventId> = console.options().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1004]);

        console.go_to(DrillState::AtMainList);
        assert_eq!(console.state(), DrillState::AtMainList);
        assert_eq!(console.breadcrumbs().len(), 1);
    }

    #[test]
    fn test_back_steps_one_level() {
        let mut console = at_hackathon();
        console.back();
        assert_eq!(console.state(), DrillState::AtCompetitionList);
        console.back();
        console.back();
        console.back();
        assert_eq!(console.state(), DrillState::AtMainList);
    }

    // ===== Team filter =====

    #[test]
    fn test_team_filter_case_insensitive() {
        let mut console = at_hackathon();
        assert_eq!(console.filtered_teams().len(), 3);

        console.set_team_filter("NULL");
        let names: Vec<&str> = console.filtered_teams().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Null Pointers"]);

        console.set_team_filter("zzz");
        assert!(console.filtered_teams().is_empty());
    }

    #[test]
    fn test_filter_reset_when_leaving_team_list() {
        let mut console = at_hackathon();
        console.set_team_filter("byte");
        console.back();
        assert_eq!(console.team_filter(), "");
    }

    // ===== Marks =====

    #[test]
    fn test_record_marks_overwrites() {
        let mut console = at_hackathon();
        console
            .record_marks(1, vec![EvaluationMark::new("Dr. Rao", 7.0)])
            .unwrap();
        console
            .record_marks(1, vec![EvaluationMark::new("Dr. Rao", 9.0), EvaluationMark::new("Dr. Iyer", 8.5)])
            .unwrap();

        let marks = console.marks_for(1).unwrap();
        assert_eq!(marks.len(), 2);
        assert_eq!(marks[0].mark, 9.0);
        assert!(console.is_evaluated(1));
        assert!(!console.is_evaluated(2));
    }

    #[test]
    fn test_record_marks_validation() {
        let mut console = at_hackathon();
        assert_eq!(
            console.record_marks(4, vec![EvaluationMark::new("Dr. Rao", 7.0)]),
            Err(EvaluationError::UnknownTeam(4))
        );
        assert!(matches!(console.record_marks(1, Vec::new()), Err(EvaluationError::Validation(_))));
        assert!(matches!(
            console.record_marks(1, vec![EvaluationMark::new("", 7.0)]),
            Err(EvaluationError::Validation(ValidationError::Required("Judge name")))
        ));
        assert!(console.marks_for(1).is_none());

        let mut top = self::console();
        assert_eq!(
            top.record_marks(1, vec![EvaluationMark::new("Dr. Rao", 7.0)]),
            Err(EvaluationError::AtTeamListOnly)
        );
    }
}
