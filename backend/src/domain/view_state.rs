//! View parameters and their synchronisation with a shareable location.
//!
//! [`ViewState`] holds the five user-adjustable parameters. The
//! [`ViewStateManager`] owns one and rewrites its [`LocationDescriptor`] every
//! time a parameter changes, so the current query string always reproduces
//! the current view.

use url::form_urlencoded;

use super::projection::{GroupBy, SortDirection, SortField};
use super::selection::SelectionSet;
use super::snapshot::Environment;

const ENV_PARAM: &str = "env";
const GROUP_BY_PARAM: &str = "groupBy";
const SORT_BY_PARAM: &str = "sortBy";
const SORT_DIR_PARAM: &str = "sortDir";
const SELECTED_PARAM: &str = "selected";

/// User-adjustable view parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub environment: Environment,
    pub group_by: GroupBy,
    pub sort_by: SortField,
    pub sort_direction: SortDirection,
    pub selected: SelectionSet,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            environment: Environment::Local,
            group_by: GroupBy::None,
            sort_by: SortField::UpdatedAt,
            sort_direction: SortDirection::Desc,
            selected: SelectionSet::new(),
        }
    }
}

impl ViewState {
    /// Hydrate from a query string, with or without the leading `?`.
    ///
    /// Absent or unrecognised values fall back to the defaults. When a
    /// parameter repeats, the first occurrence wins.
    ///
    /// # Examples
    /// ```
    /// use project_explorer::domain::{GroupBy, SortField, ViewState};
    ///
    /// let state = ViewState::from_query("?groupBy=agency&sortBy=bogus&selected=a,,b,a");
    /// assert_eq!(state.group_by, GroupBy::Agency);
    /// assert_eq!(state.sort_by, SortField::UpdatedAt);
    /// assert_eq!(state.selected.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    /// ```
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut env = None;
        let mut group_by = None;
        let mut sort_by = None;
        let mut sort_dir = None;
        let mut selected = None;
        for (name, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match name.as_ref() {
                ENV_PARAM => &mut env,
                GROUP_BY_PARAM => &mut group_by,
                SORT_BY_PARAM => &mut sort_by,
                SORT_DIR_PARAM => &mut sort_dir,
                SELECTED_PARAM => &mut selected,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        let defaults = Self::default();
        Self {
            environment: env
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.environment),
            group_by: group_by
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.group_by),
            sort_by: sort_by
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.sort_by),
            sort_direction: sort_dir
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.sort_direction),
            selected: selected
                .map(|raw| parse_selection(&raw))
                .unwrap_or(defaults.selected),
        }
    }

    /// Serialise to a query string without the leading `?`.
    ///
    /// `selected` is omitted when empty; every other parameter is always
    /// present.
    #[must_use]
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer
            .append_pair(ENV_PARAM, self.environment.as_str())
            .append_pair(GROUP_BY_PARAM, self.group_by.as_str())
            .append_pair(SORT_BY_PARAM, self.sort_by.as_str())
            .append_pair(SORT_DIR_PARAM, self.sort_direction.as_str());
        if !self.selected.is_empty() {
            let joined = self.selected.iter().collect::<Vec<_>>().join(",");
            serializer.append_pair(SELECTED_PARAM, &joined);
        }
        serializer.finish()
    }

    fn apply(&mut self, update: ViewStateUpdate) {
        let ViewStateUpdate {
            environment,
            group_by,
            sort_by,
            sort_direction,
            selected,
        } = update;
        if let Some(environment) = environment {
            self.environment = environment;
        }
        if let Some(group_by) = group_by {
            self.group_by = group_by;
        }
        if let Some(sort_by) = sort_by {
            self.sort_by = sort_by;
        }
        if let Some(sort_direction) = sort_direction {
            self.sort_direction = sort_direction;
        }
        if let Some(selected) = selected {
            self.selected = selected;
        }
    }
}

/// Ids are taken verbatim between commas, so an id may hold spaces but never a
/// comma. Empty segments are dropped.
fn parse_selection(raw: &str) -> SelectionSet {
    raw.split(',')
        .filter(|id| !id.is_empty())
        .collect()
}

/// Partial change to a [`ViewState`]; unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewStateUpdate {
    environment: Option<Environment>,
    group_by: Option<GroupBy>,
    sort_by: Option<SortField>,
    sort_direction: Option<SortDirection>,
    selected: Option<SelectionSet>,
}

impl ViewStateUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    #[must_use]
    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = Some(group_by);
        self
    }

    #[must_use]
    pub fn sort_by(mut self, sort_by: SortField) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    #[must_use]
    pub fn sort_direction(mut self, sort_direction: SortDirection) -> Self {
        self.sort_direction = Some(sort_direction);
        self
    }

    /// Replace the whole selection.
    #[must_use]
    pub fn selected(mut self, selected: SelectionSet) -> Self {
        self.selected = Some(selected);
        self
    }
}

/// Shareable location whose query string mirrors the view.
///
/// Implementations replace the query in place; they never navigate.
pub trait LocationDescriptor {
    /// Current query string, without the leading `?`.
    fn query(&self) -> String;

    /// Replace the query string in place.
    fn replace_query(&mut self, query: &str);
}

/// Location held in memory, used by the terminal explorer and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryLocation {
    path: String,
    query: String,
    replacements: usize,
}

impl InMemoryLocation {
    /// Location at `path` with the given initial query.
    #[must_use]
    pub fn new(path: impl Into<String>, query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            path: path.into(),
            query: query.strip_prefix('?').map_or_else(|| query.clone(), str::to_owned),
            replacements: 0,
        }
    }

    /// Path plus query, suitable for sharing.
    #[must_use]
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    /// Number of in-place rewrites so far.
    #[must_use]
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl LocationDescriptor for InMemoryLocation {
    fn query(&self) -> String {
        self.query.clone()
    }

    fn replace_query(&mut self, query: &str) {
        self.query = query.to_owned();
        self.replacements += 1;
    }
}

/// Owns the view state and keeps a location in step with it.
///
/// Every mutator changes the state and rewrites the location exactly once,
/// so the two can never be observed out of sync.
#[derive(Debug)]
pub struct ViewStateManager<L> {
    state: ViewState,
    location: L,
}

impl<L: LocationDescriptor> ViewStateManager<L> {
    /// Hydrate from `location` and rewrite it in canonical form.
    pub fn hydrate(mut location: L) -> Self {
        let state = ViewState::from_query(&location.query());
        location.replace_query(&state.to_query());
        Self { state, location }
    }

    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    #[must_use]
    pub fn location(&self) -> &L {
        &self.location
    }

    /// Apply `update` and synchronise the location.
    ///
    /// The selection survives environment changes unpruned.
    pub fn set_view_state(&mut self, update: ViewStateUpdate) {
        self.state.apply(update);
        self.sync();
    }

    /// Add `id` to the selection.
    pub fn select(&mut self, id: &str) {
        self.state.selected.insert(id);
        self.sync();
    }

    /// Remove `id` from the selection.
    pub fn deselect(&mut self, id: &str) {
        self.state.selected.remove(id);
        self.sync();
    }

    /// Replace the selection with `ids`.
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        self.state.selected = ids.into_iter().collect();
        self.sync();
    }

    /// Empty the selection.
    pub fn clear_all(&mut self) {
        self.state.selected.clear();
        self.sync();
    }

    fn sync(&mut self) {
        self.location.replace_query(&self.state.to_query());
    }
}
