use std::collections::BTreeSet;

use tracing::debug;

use super::{ApiClient, ClientError, ListParams};
use crate::database::models::{Measurement, MeasurementView, Series};
use crate::services::MeasurementInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
}

/// What the driver has to do after a state transition.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    FetchMeasurements,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    pub start: Option<String>,
    pub end: Option<String>,
    pub selected: BTreeSet<i32>,
}

/// Dashboard view state: loaded data, filters, and the highlighted row.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub load: LoadState,
    pub series: Vec<Series>,
    pub measurements: Vec<MeasurementView>,
    pub filters: Filters,
    pub highlighted: Option<i32>,
    pub error: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_loading(&mut self) {
        self.load = LoadState::Loading;
        self.error = None;
    }

    /// New series list; every loaded series becomes selected.
    pub fn series_loaded(&mut self, series: Vec<Series>) -> Effect {
        self.filters.selected = series.iter().map(|s| s.id).collect();
        self.series = series;
        Effect::FetchMeasurements
    }

    pub fn measurements_loaded(&mut self, rows: Vec<MeasurementView>) {
        self.measurements = rows;
        self.load = LoadState::Ready;
    }

    pub fn load_failed(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.load = LoadState::Ready;
    }

    pub fn toggle_series(&mut self, id: i32) -> Effect {
        self.highlighted = None;
        if !self.filters.selected.remove(&id) {
            self.filters.selected.insert(id);
        }
        Effect::FetchMeasurements
    }

    /// Restrict the selection to `ids`, ignoring ids that are not loaded.
    pub fn select_only(&mut self, ids: &[i32]) -> Effect {
        self.highlighted = None;
        self.filters.selected = self
            .series
            .iter()
            .map(|s| s.id)
            .filter(|id| ids.contains(id))
            .collect();
        Effect::FetchMeasurements
    }

    pub fn set_time_range(&mut self, start: Option<String>, end: Option<String>) -> Effect {
        self.filters.start = start.filter(|s| !s.is_empty());
        self.filters.end = end.filter(|s| !s.is_empty());
        Effect::FetchMeasurements
    }

    /// Highlight a row, or clear the highlight when it is already selected.
    pub fn select_row(&mut self, id: i32) {
        self.highlighted = if self.highlighted == Some(id) { None } else { Some(id) };
    }

    /// After any add/edit/delete.
    pub fn mutated(&mut self) -> Effect {
        Effect::FetchMeasurements
    }

    pub fn query(&self) -> ListParams {
        ListParams {
            series_ids: self.filters.selected.iter().copied().collect(),
            start: self.filters.start.clone(),
            end: self.filters.end.clone(),
        }
    }

    pub fn highlighted_row(&self) -> Option<&MeasurementView> {
        let id = self.highlighted?;
        self.measurements.iter().find(|m| m.id == id)
    }
}

/// Runs [`DashboardState`] effects against the API.
pub struct Dashboard<'a> {
    client: &'a mut ApiClient,
    pub state: DashboardState,
}

impl<'a> Dashboard<'a> {
    pub fn new(client: &'a mut ApiClient) -> Self {
        Self {
            client,
            state: DashboardState::new(),
        }
    }

    pub fn client(&self) -> &ApiClient {
        self.client
    }

    /// Load series, then the measurements they select.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        self.state.begin_loading();
        let series = match self.client.list_series().await {
            Ok(series) => series,
            Err(e) => {
                self.state.load_failed(format!("Could not load series: {}", e));
                return Err(e);
            }
        };
        let effect = self.state.series_loaded(series);
        self.apply(effect).await
    }

    pub async fn apply(&mut self, effect: Effect) -> Result<(), ClientError> {
        match effect {
            Effect::None => Ok(()),
            Effect::FetchMeasurements => self.refresh_measurements().await,
        }
    }

    pub async fn refresh_measurements(&mut self) -> Result<(), ClientError> {
        self.state.begin_loading();
        let params = self.state.query();
        debug!("Fetching measurements with {:?}", params);
        match self.client.list_measurements(&params).await {
            Ok(rows) => {
                self.state.measurements_loaded(rows);
                Ok(())
            }
            Err(e) => {
                self.state.load_failed(format!("Could not load measurements: {}", e));
                Err(e)
            }
        }
    }

    pub async fn toggle_series(&mut self, id: i32) -> Result<(), ClientError> {
        let effect = self.state.toggle_series(id);
        self.apply(effect).await
    }

    pub async fn select_only(&mut self, ids: &[i32]) -> Result<(), ClientError> {
        let effect = self.state.select_only(ids);
        self.apply(effect).await
    }

    pub async fn set_time_range(&mut self, start: Option<String>, end: Option<String>) -> Result<(), ClientError> {
        let effect = self.state.set_time_range(start, end);
        self.apply(effect).await
    }

    pub async fn add_measurement(&mut self, input: &MeasurementInput) -> Result<Measurement, ClientError> {
        let result = self.client.create_measurement(input).await;
        self.after_mutation(result).await
    }

    pub async fn edit_measurement(&mut self, id: i32, input: &MeasurementInput) -> Result<Measurement, ClientError> {
        let result = self.client.update_measurement(id, input).await;
        self.after_mutation(result).await
    }

    pub async fn delete_measurement(&mut self, id: i32) -> Result<(), ClientError> {
        let result = self.client.delete_measurement(id).await;
        self.after_mutation(result).await
    }

    /// Record a failed write verbatim, or refetch after a successful one.
    async fn after_mutation<T>(&mut self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        match result {
            Ok(value) => {
                let effect = self.state.mutated();
                self.apply(effect).await?;
                Ok(value)
            }
            Err(e) => {
                self.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(id: i32, name: &str) -> Series {
        Series {
            id,
            name: name.to_string(),
            min_value: 0.0,
            max_value: 100.0,
            color: None,
            icon: None,
        }
    }

    fn loaded() -> DashboardState {
        let mut state = DashboardState::new();
        state.begin_loading();
        let effect = state.series_loaded(vec![series(1, "A"), series(2, "B"), series(3, "C")]);
        assert_eq!(effect, Effect::FetchMeasurements);
        state.measurements_loaded(Vec::new());
        state
    }

    #[test]
    fn loading_series_selects_all() {
        let state = loaded();
        assert_eq!(state.load, LoadState::Ready);
        assert_eq!(state.filters.selected, BTreeSet::from([1, 2, 3]));
        assert_eq!(state.query().series_ids, vec![1, 2, 3]);
    }

    #[test]
    fn toggling_a_series_clears_highlight_and_refetches() {
        let mut state = loaded();
        state.select_row(7);
        assert_eq!(state.highlighted, Some(7));

        assert_eq!(state.toggle_series(2), Effect::FetchMeasurements);
        assert_eq!(state.highlighted, None);
        assert_eq!(state.filters.selected, BTreeSet::from([1, 3]));

        let _ = state.toggle_series(2);
        assert_eq!(state.filters.selected, BTreeSet::from([1, 2, 3]));
    }

    #[test]
    fn selecting_same_row_twice_clears_highlight() {
        let mut state = loaded();
        state.select_row(4);
        state.select_row(4);
        assert_eq!(state.highlighted, None);
        state.select_row(4);
        state.select_row(5);
        assert_eq!(state.highlighted, Some(5));
    }

    #[test]
    fn query_reflects_filters() {
        let mut state = loaded();
        let _ = state.select_only(&[3, 1, 99]);
        let _ = state.set_time_range(Some("2024-01-01T00:00".into()), Some(String::new()));

        let query = state.query();
        assert_eq!(query.series_ids, vec![1, 3]);
        assert_eq!(query.start.as_deref(), Some("2024-01-01T00:00"));
        assert_eq!(query.end, None);
    }

    #[test]
    fn empty_selection_omits_series_filter() {
        let mut state = loaded();
        for id in [1, 2, 3] {
            let _ = state.toggle_series(id);
        }
        assert!(state.query().query_pairs().is_empty());
    }

    #[test]
    fn failure_is_recorded_and_cleared_on_next_load() {
        let mut state = loaded();
        state.load_failed("Could not load measurements");
        assert_eq!(state.error.as_deref(), Some("Could not load measurements"));
        state.begin_loading();
        assert_eq!(state.load, LoadState::Loading);
        assert_eq!(state.error, None);
    }

    #[test]
    fn mutation_requests_refetch() {
        let mut state = loaded();
        assert_eq!(state.mutated(), Effect::FetchMeasurements);
    }
}
