//! The report store: working draft, saved reports, and every mutation.

use at_calc::{CalculatedResults, FlowSeries, MeasurementFlows, refresh_sub_volume};
use at_core::{new_id, now_timestamp};
use at_report::{
    BuildingConditions, BuildingConditionsPatch, GeneralInfo, GeneralInfoPatch, LeakageItem,
    LeakageItemPatch, MeasurementRow, MeasurementRowPatch, Report, ReportData, Results,
    ResultsPatch, SavedReport, SealItem, SealItemPatch, StoredState, UNTITLED_REPORT, VolumeRow,
    VolumeRowPatch, load_document, save_document,
};
use tracing::{debug, info, warn};

use crate::StoreResult;
use crate::config::StoreConfig;
use crate::paste::{MeasurementField, VolumeField, parse_volume_rows};
use crate::storage::KeyValueStorage;

/// Owns the working draft and the saved reports.
///
/// Every mutating call finishes by writing the serializable state through to
/// storage under the configured key. Write failures are logged and do not
/// undo the in-memory change; call [`ReportStore::flush`] to observe them.
pub struct ReportStore<S: KeyValueStorage> {
    storage: S,
    config: StoreConfig,
    state: StoredState,
    has_unsaved_changes: bool,
    write_through: bool,
}

impl<S: KeyValueStorage> ReportStore<S> {
    /// Load the persisted state under the configured key, or start from a
    /// fresh draft when there is none or it cannot be read.
    ///
    /// An unreadable document is copied to [`StoreConfig::backup_key`] before
    /// anything can overwrite it. If that copy fails, or storage could not be
    /// read at all, write-through stays off until [`ReportStore::flush`]
    /// succeeds.
    pub fn open(mut storage: S, config: StoreConfig) -> Self {
        let mut write_through = true;
        let state = match storage.get(&config.storage_key) {
            Ok(Some(content)) => match load_document(&content) {
                Ok(doc) => {
                    debug!(
                        key = %config.storage_key,
                        saved_reports = doc.state.saved_reports.len(),
                        "loaded persisted report state"
                    );
                    doc.state
                }
                Err(err) => {
                    warn!(key = %config.storage_key, error = %err, "unreadable report state, starting fresh");
                    let backup_key = config.backup_key();
                    match storage.set(&backup_key, &content) {
                        Ok(()) => info!(key = %backup_key, "kept unreadable report state"),
                        Err(err) => {
                            warn!(key = %backup_key, error = %err, "backup failed, write-through suspended");
                            write_through = false;
                        }
                    }
                    fresh_state(&config)
                }
            },
            Ok(None) => fresh_state(&config),
            Err(err) => {
                warn!(key = %config.storage_key, error = %err, "storage read failed, write-through suspended");
                write_through = false;
                fresh_state(&config)
            }
        };

        let mut store = Self {
            storage,
            config,
            state,
            has_unsaved_changes: false,
            write_through,
        };
        store.refresh_derived();
        store
    }

    /// Write the serializable state to storage now. A successful flush
    /// re-enables write-through if it was suspended by [`ReportStore::open`].
    pub fn flush(&mut self) -> StoreResult<()> {
        let content = save_document(&self.state)?;
        self.storage.set(&self.config.storage_key, &content)?;
        self.write_through = true;
        Ok(())
    }

    /// Whether mutations are currently written through to storage.
    pub fn is_writing_through(&self) -> bool {
        self.write_through
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ---- reads ----

    pub fn draft(&self) -> &ReportData {
        &self.state.draft
    }

    pub fn general_info(&self) -> &GeneralInfo {
        &self.state.draft.general_info
    }

    pub fn building_conditions(&self) -> &BuildingConditions {
        &self.state.draft.building_conditions
    }

    pub fn volume_rows(&self) -> &[VolumeRow] {
        &self.state.draft.volume_rows
    }

    pub fn seal_items(&self) -> &[SealItem] {
        &self.state.draft.seal_items
    }

    pub fn leakage_items(&self) -> &[LeakageItem] {
        &self.state.draft.leakage_items
    }

    pub fn measurement_rows(&self) -> &[MeasurementRow] {
        &self.state.draft.measurement_rows
    }

    pub fn results(&self) -> &Results {
        &self.state.draft.results
    }

    /// Id of the saved report the draft overwrites on save, if any.
    pub fn current_report_id(&self) -> Option<&str> {
        self.state.current_report_id.as_deref()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn saved_reports(&self) -> &[Report] {
        &self.state.saved_reports
    }

    pub fn saved_reports_list(&self) -> Vec<SavedReport> {
        self.state.saved_reports.iter().map(SavedReport::from).collect()
    }

    pub fn calculated_results(&self) -> CalculatedResults {
        at_calc::calculate(&self.state.draft)
    }

    pub fn measurement_flows(&self) -> Vec<MeasurementFlows> {
        let total = at_calc::total_volume(&self.state.draft.volume_rows);
        at_calc::measurement_flows(&self.state.draft.measurement_rows, total)
    }

    pub fn flow_series(&self) -> FlowSeries {
        let total = at_calc::total_volume(&self.state.draft.volume_rows);
        at_calc::flow_series(&self.state.draft.measurement_rows, total)
    }

    // ---- singletons ----

    pub fn update_general_info(&mut self, patch: GeneralInfoPatch) {
        patch.apply(&mut self.state.draft.general_info);
        self.touch();
    }

    pub fn update_building_conditions(&mut self, patch: BuildingConditionsPatch) {
        patch.apply(&mut self.state.draft.building_conditions);
        self.touch();
    }

    pub fn update_results(&mut self, patch: ResultsPatch) {
        patch.apply(&mut self.state.draft.results);
        self.touch();
    }

    // ---- volume rows ----

    pub fn add_volume_row(&mut self) {
        self.state.draft.volume_rows.push(VolumeRow::default());
        self.touch();
    }

    /// Drop the last row, never the only one.
    pub fn remove_volume_row(&mut self) {
        if self.state.draft.volume_rows.len() > 1 {
            self.state.draft.volume_rows.pop();
            self.touch();
        }
    }

    /// Merge `patch` into the row with `id` and recompute its volume.
    /// Unknown ids are ignored.
    pub fn update_volume_row(&mut self, id: &str, patch: VolumeRowPatch) {
        if let Some(row) = self.state.draft.volume_rows.iter_mut().find(|r| r.id == id) {
            patch.apply(row);
            refresh_sub_volume(row);
            self.touch();
        }
    }

    /// Ingest whole rows pasted from a spreadsheet. A lone untouched row is
    /// replaced; otherwise rows are appended. Returns the rows accepted.
    pub fn paste_volume_rows(&mut self, text: &str) -> usize {
        let rows = parse_volume_rows(text);
        if rows.is_empty() {
            return 0;
        }
        let count = rows.len();

        let volume_rows = &mut self.state.draft.volume_rows;
        if volume_rows.len() == 1 && volume_rows[0].is_blank() {
            *volume_rows = rows;
        } else {
            volume_rows.extend(rows);
        }

        debug!(count, "pasted volume rows");
        self.touch();
        count
    }

    /// Write `values` down one volume column from `start`, adding rows as
    /// needed. Returns how many values were written.
    pub fn paste_volume_column<T: AsRef<str>>(
        &mut self,
        field: VolumeField,
        start: usize,
        values: &[T],
    ) -> usize {
        let values = self.capped(values);
        if values.is_empty() {
            return 0;
        }

        let len = self.state.draft.volume_rows.len();
        let Some(needed) = self.column_end(len, start, values.len()) else {
            return 0;
        };
        let rows = &mut self.state.draft.volume_rows;
        if rows.len() < needed {
            rows.resize_with(needed, VolumeRow::default);
        }
        for (row, value) in rows[start..].iter_mut().zip(values) {
            field.write(row, value.as_ref());
        }

        debug!(?field, start, count = values.len(), "pasted volume column");
        self.touch();
        values.len()
    }

    // ---- seal items ----

    pub fn add_seal_item(&mut self) {
        self.state.draft.seal_items.push(SealItem::default());
        self.touch();
    }

    pub fn remove_seal_item(&mut self) {
        if self.state.draft.seal_items.pop().is_some() {
            self.touch();
        }
    }

    pub fn update_seal_item(&mut self, id: &str, patch: SealItemPatch) {
        if let Some(item) = self.state.draft.seal_items.iter_mut().find(|i| i.id == id) {
            patch.apply(item);
            self.touch();
        }
    }

    // ---- leakage items ----

    pub fn add_leakage_item(&mut self) {
        self.state.draft.leakage_items.push(LeakageItem::default());
        self.touch();
    }

    pub fn remove_leakage_item(&mut self) {
        if self.state.draft.leakage_items.pop().is_some() {
            self.touch();
        }
    }

    pub fn update_leakage_item(&mut self, id: &str, patch: LeakageItemPatch) {
        if let Some(item) = self
            .state
            .draft
            .leakage_items
            .iter_mut()
            .find(|i| i.id == id)
        {
            patch.apply(item);
            self.touch();
        }
    }

    // ---- measurement rows ----

    pub fn add_measurement_row(&mut self) {
        self.state.draft.measurement_rows.push(MeasurementRow::default());
        self.touch();
    }

    pub fn remove_measurement_row(&mut self) {
        if self.state.draft.measurement_rows.len() > 1 {
            self.state.draft.measurement_rows.pop();
            self.touch();
        }
    }

    pub fn update_measurement_row(&mut self, id: &str, patch: MeasurementRowPatch) {
        if let Some(row) = self
            .state
            .draft
            .measurement_rows
            .iter_mut()
            .find(|r| r.id == id)
        {
            patch.apply(row);
            self.touch();
        }
    }

    pub fn paste_measurement_column<T: AsRef<str>>(
        &mut self,
        field: MeasurementField,
        start: usize,
        values: &[T],
    ) -> usize {
        let values = self.capped(values);
        if values.is_empty() {
            return 0;
        }

        let len = self.state.draft.measurement_rows.len();
        let Some(needed) = self.column_end(len, start, values.len()) else {
            return 0;
        };
        let rows = &mut self.state.draft.measurement_rows;
        if rows.len() < needed {
            rows.resize_with(needed, MeasurementRow::default);
        }
        for (row, value) in rows[start..].iter_mut().zip(values) {
            field.write(row, value.as_ref());
        }

        debug!(?field, start, count = values.len(), "pasted measurement column");
        self.touch();
        values.len()
    }

    // ---- report management ----

    /// Snapshot the draft into the saved list. An unbound draft becomes a new
    /// report; a bound one overwrites its report, keeping id and `createdAt`.
    pub fn save(&mut self, name: Option<&str>) {
        let now = now_timestamp();
        let name = self.resolve_name(name);
        let data = self.state.draft.clone();

        let existing = self.state.current_report_id.as_ref().and_then(|id| {
            self.state
                .saved_reports
                .iter()
                .position(|report| &report.id == id)
        });

        let id = match existing {
            Some(index) => {
                let report = &mut self.state.saved_reports[index];
                report.name = name;
                report.updated_at = now;
                report.data = data;
                info!(id = %report.id, "updated saved report");
                report.id.clone()
            }
            None => {
                // A bound id whose report is gone is saved back under the same id.
                let id = self.state.current_report_id.clone().unwrap_or_else(new_id);
                self.state.saved_reports.push(Report {
                    id: id.clone(),
                    name,
                    created_at: now.clone(),
                    updated_at: now,
                    data,
                });
                info!(id = %id, "created saved report");
                id
            }
        };

        self.state.current_report_id = Some(id);
        self.has_unsaved_changes = false;
        self.persist();
    }

    /// Replace the draft with a copy of a saved report and bind to it.
    /// Entity ids are kept as saved. Unknown ids are ignored.
    pub fn load(&mut self, id: &str) {
        let Some(report) = self.state.saved_reports.iter().find(|r| r.id == id) else {
            debug!(id, "load ignored, no such report");
            return;
        };

        self.state.draft = report.data.clone();
        self.state.current_report_id = Some(report.id.clone());
        self.has_unsaved_changes = false;
        info!(id, "loaded saved report");
        self.persist();
    }

    /// Remove a saved report. The draft keeps its contents; it is only
    /// unbound if it was bound to the deleted report.
    pub fn delete(&mut self, id: &str) {
        let before = self.state.saved_reports.len();
        self.state.saved_reports.retain(|r| r.id != id);
        if self.state.saved_reports.len() == before {
            return;
        }

        if self.state.current_report_id.as_deref() == Some(id) {
            self.state.current_report_id = None;
        }
        info!(id, "deleted saved report");
        self.persist();
    }

    /// Discard the draft and its binding, starting over from defaults.
    pub fn new_report(&mut self) {
        self.state.draft = self.config.defaults.new_draft();
        self.state.current_report_id = None;
        self.has_unsaved_changes = false;
        info!("started new report");
        self.persist();
    }

    /// Replace the draft with the contents of an interchange token. Returns
    /// `false`, leaving the draft untouched, if the token cannot be decoded.
    pub fn import_legacy(&mut self, token: &str) -> bool {
        match at_codec::decode_report(token, &self.config.defaults) {
            Ok(data) => {
                self.state.draft = data;
                self.state.current_report_id = None;
                self.has_unsaved_changes = true;
                info!("imported report from interchange token");
                self.persist();
                true
            }
            Err(err) => {
                warn!(error = %err, "interchange token rejected");
                false
            }
        }
    }

    /// Encode the draft as an interchange token.
    pub fn export_legacy(&self) -> StoreResult<String> {
        Ok(at_codec::encode_report(&self.state.draft)?)
    }

    /// Drop rows nobody filled in. Volume and measurement tables keep at
    /// least one row. Returns how many rows were removed.
    pub fn cleanup_empty_rows(&mut self) -> usize {
        let draft = &mut self.state.draft;

        let removed = retain_keeping_one(&mut draft.volume_rows, |r| !r.is_blank())
            + retain_counted(&mut draft.seal_items, |i| !i.is_blank())
            + retain_counted(&mut draft.leakage_items, |i| !i.is_blank())
            + retain_keeping_one(&mut draft.measurement_rows, |r| !r.is_blank());

        if removed > 0 {
            info!(removed, "removed empty rows");
            self.touch();
        }
        removed
    }

    // ---- internals ----

    /// Explicit name, else the project name, else a placeholder.
    fn resolve_name(&self, name: Option<&str>) -> String {
        [
            name.unwrap_or_default(),
            self.state.draft.general_info.project_name.as_str(),
        ]
        .into_iter()
        .find(|n| !n.trim().is_empty())
        .unwrap_or(UNTITLED_REPORT)
        .to_string()
    }

    /// One past the last row a column paste writes, or `None` when `start`
    /// lies further past the table end than a whole paste may reach.
    fn column_end(&self, len: usize, start: usize, count: usize) -> Option<usize> {
        let reach = len.saturating_add(self.config.paste_row_limit);
        if start > reach {
            warn!(start, len, "paste start out of range");
            return None;
        }
        start.checked_add(count)
    }

    fn capped<'v, T>(&self, values: &'v [T]) -> &'v [T] {
        let limit = self.config.paste_row_limit;
        if values.len() > limit {
            warn!(supplied = values.len(), limit, "paste truncated");
        }
        &values[..values.len().min(limit)]
    }

    /// Recompute cached derived fields after reading persisted state.
    fn refresh_derived(&mut self) {
        let drafts = std::iter::once(&mut self.state.draft)
            .chain(self.state.saved_reports.iter_mut().map(|r| &mut r.data));
        for data in drafts {
            data.volume_rows.iter_mut().for_each(refresh_sub_volume);
        }
    }

    fn touch(&mut self) {
        self.has_unsaved_changes = true;
        self.persist();
    }

    fn persist(&mut self) {
        if !self.write_through {
            debug!(key = %self.config.storage_key, "write-through suspended, not persisting");
            return;
        }
        if let Err(err) = self.flush() {
            warn!(key = %self.config.storage_key, error = %err, "failed to persist report state");
        }
    }
}

fn fresh_state(config: &StoreConfig) -> StoredState {
    StoredState {
        current_report_id: None,
        draft: config.defaults.new_draft(),
        saved_reports: Vec::new(),
    }
}

/// `Vec::retain` that reports how many entries it dropped.
fn retain_counted<T>(items: &mut Vec<T>, keep: impl FnMut(&T) -> bool) -> usize {
    let before = items.len();
    items.retain(keep);
    before - items.len()
}

/// Like [`retain_counted`], but when nothing would be kept the first entry
/// stays so the list never empties.
fn retain_keeping_one<T>(items: &mut Vec<T>, mut keep: impl FnMut(&T) -> bool) -> usize {
    if items.iter().any(&mut keep) {
        retain_counted(items, keep)
    } else {
        let before = items.len();
        items.truncate(1);
        before - items.len()
    }
}
