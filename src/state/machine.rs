use super::case::{BatchRef, CaseData, ComparisonCase};
use super::focus;
use super::message::{ChartControlAllocation, Effect, Message, Notice};
use crate::engine::{InitialValues, InputEngine, OptionCache};
use crate::error::StateError;
use crate::schema::ModuleSchema;
use ahash::AHashMap;
use itertools::Itertools;
use tracing::{debug, warn};
use uuid::Uuid;

/// Static configuration of one comparison module.
#[derive(Debug, Clone)]
pub struct ModuleConfig {
    /// Module type; scopes persisted names.
    pub module: String,
    pub sub_module: Option<String>,
    pub max_comparison_cases: usize,
}

/// The reducer's state: the ordered case list plus cross-case derived flags.
#[derive(Debug, Clone)]
pub struct ModuleState {
    pub comparison_cases: Vec<ComparisonCase>,
    pub is_focus_link_active: bool,
    pub chart_control_allocation: ChartControlAllocation,
    pub saved_batch: Option<BatchRef>,
}

impl ModuleState {
    pub fn is_comparison_mode(&self) -> bool {
        self.comparison_cases.len() > 1
    }
}

/// The comparison state machine. Owns one input engine per case slot and
/// keeps them in lockstep with the case list; every mutation goes through
/// [`ComparisonBoard::apply`], which returns the side effects the transition
/// requested.
pub struct ComparisonBoard {
    config: ModuleConfig,
    schema: ModuleSchema,
    context: AHashMap<String, String>,
    state: ModuleState,
    engines: Vec<InputEngine>,
    option_cache: OptionCache,
    notices: Vec<Notice>,
}

impl ComparisonBoard {
    /// Starts with a single empty case, as on first mount.
    pub fn new(
        config: ModuleConfig,
        schema: ModuleSchema,
        context: AHashMap<String, String>,
    ) -> Result<Self, StateError> {
        let case = ComparisonCase::empty();
        let engine = InputEngine::initialize(&schema, InitialValues::Fresh, context.clone())
            .map_err(StateError::Resolve)?;
        let mut board = Self {
            config,
            schema,
            context,
            state: ModuleState {
                comparison_cases: vec![case],
                is_focus_link_active: false,
                chart_control_allocation: ChartControlAllocation::Individual,
                saved_batch: None,
            },
            engines: vec![engine],
            option_cache: OptionCache::new(),
            notices: Vec::new(),
        };
        board.recompute_derived();
        Ok(board)
    }

    pub fn config(&self) -> &ModuleConfig {
        &self.config
    }

    pub fn schema(&self) -> &ModuleSchema {
        &self.schema
    }

    pub fn state(&self) -> &ModuleState {
        &self.state
    }

    pub fn case(&self, index: usize) -> Option<&ComparisonCase> {
        self.state.comparison_cases.get(index)
    }

    pub fn engine(&self, index: usize) -> Option<&InputEngine> {
        self.engines.get(index)
    }

    pub fn option_cache(&self) -> &OptionCache {
        &self.option_cache
    }

    pub(crate) fn option_cache_mut(&mut self) -> &mut OptionCache {
        &mut self.option_cache
    }

    pub(crate) fn engine_mut(&mut self, index: usize) -> Option<&mut InputEngine> {
        self.engines.get_mut(index)
    }

    /// Drains the notices accumulated since the last call, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Installs the batch reference a just-completed batch save produced.
    pub(crate) fn adopt_saved_batch(&mut self, batch: BatchRef) {
        self.state.saved_batch = Some(batch);
        self.recompute_derived();
    }

    /// Applies one transition and returns the side effects it requested.
    /// Derived flags are recomputed after every transition.
    pub fn apply(&mut self, message: Message) -> Result<Vec<Effect>, StateError> {
        let effects = self.transition(message)?;
        focus::enforce(&mut self.state, &self.engines, &mut self.notices);
        self.recompute_derived();
        Ok(effects)
    }

    fn transition(&mut self, message: Message) -> Result<Vec<Effect>, StateError> {
        match message {
            Message::AddComparisonCol => {
                self.check_capacity(self.state.comparison_cases.len() + 1)?;
                self.state.comparison_cases.push(ComparisonCase::empty());
                self.engines.push(self.fresh_engine()?);
                Ok(Vec::new())
            }
            Message::SetComparisonCaseIdAtIndex {
                index,
                saved_case_id,
            } => {
                self.grow_to(index)?;
                self.state.comparison_cases[index].is_loading = true;
                Ok(vec![Effect::LoadSavedCase {
                    index,
                    saved_case_id,
                }])
            }
            Message::SetComparisonCaseAtIndex { index, case } => {
                self.grow_to(index)?;
                let engine = self.engine_for_case(&case)?;
                if let Some(batch) = &self.state.saved_batch {
                    if !batch.case_ids.contains(&case.identity()) {
                        debug!(case = %case.identity(), "case is not a batch member; dropping batch reference");
                        self.state.saved_batch = None;
                    }
                }
                self.state.comparison_cases[index] = *case;
                self.engines[index] = engine;
                Ok(Vec::new())
            }
            Message::DuplicateCaseAtIndexWithData { index } => {
                self.check_bounds(index)?;
                self.check_capacity(self.state.comparison_cases.len() + 1)?;
                let copy = self.state.comparison_cases[index].duplicate();
                let engine = self.engine_for_case(&copy)?;
                self.state.comparison_cases.insert(index + 1, copy);
                self.engines.insert(index + 1, engine);
                Ok(Vec::new())
            }
            Message::ResetComparisonCaseAtIndex { index } => {
                self.check_bounds(index)?;
                self.state.comparison_cases[index] = ComparisonCase::empty();
                self.engines[index] = self.fresh_engine()?;
                Ok(Vec::new())
            }
            Message::ClearComparisonCaseAtIndex { index } => {
                self.check_bounds(index)?;
                if self.state.comparison_cases[index].is_empty() {
                    debug!(index, "clear requested for an already-empty case");
                    return Ok(Vec::new());
                }
                let case = &mut self.state.comparison_cases[index];
                let open_states = case
                    .data
                    .take()
                    .map(|d| d.input_group_open_states)
                    .unwrap_or_default();
                case.saved_case_id = None;
                case.name = None;
                case.is_running = false;
                case.is_loading = false;
                case.data = Some(CaseData {
                    input_group_open_states: open_states,
                    ..CaseData::default()
                });
                self.engines[index] = InputEngine::initialize(
                    &self.schema,
                    InitialValues::Cleared,
                    self.context.clone(),
                )
                .map_err(StateError::Resolve)?;
                self.state.saved_batch = None;
                Ok(Vec::new())
            }
            Message::SetCaseToRunningAtIndex { index } => {
                self.check_bounds(index)?;
                let case = &mut self.state.comparison_cases[index];
                if case.has_result() {
                    warn!(index, "run rejected: case already has an analysis result");
                    return Ok(Vec::new());
                }
                case.is_running = true;
                case.data = None;
                Ok(Vec::new())
            }
            Message::StopRunningCaseAtIndex { index } => {
                self.check_bounds(index)?;
                self.state.comparison_cases[index].is_running = false;
                Ok(Vec::new())
            }
            Message::SetAnalysisResultAtIndex { index, result } => {
                self.check_bounds(index)?;
                let input_values = self.engines[index].visible_values();
                let case = &mut self.state.comparison_cases[index];
                let open_states = case
                    .data
                    .take()
                    .map(|d| d.input_group_open_states)
                    .unwrap_or_default();
                case.is_running = false;
                case.data = Some(CaseData {
                    input_values,
                    analysis_result: Some(result),
                    custom_data: None,
                    input_group_open_states: open_states,
                });
                Ok(Vec::new())
            }
            Message::RemoveComparisonCaseAtIndex { index } => {
                self.check_bounds(index)?;
                self.state.comparison_cases.remove(index);
                self.engines.remove(index);
                if self.state.comparison_cases.is_empty() {
                    self.state.comparison_cases.push(ComparisonCase::empty());
                    self.engines.push(self.fresh_engine()?);
                }
                Ok(Vec::new())
            }
            Message::DeleteSavedCaseIds { ids } => {
                let mut kept_engines = Vec::new();
                let mut kept_cases = Vec::new();
                for (case, engine) in self
                    .state
                    .comparison_cases
                    .drain(..)
                    .zip(self.engines.drain(..))
                {
                    let deleted = case
                        .saved_case_id
                        .is_some_and(|saved| ids.contains(&saved));
                    if !deleted {
                        kept_cases.push(case);
                        kept_engines.push(engine);
                    }
                }
                self.state.comparison_cases = kept_cases;
                self.engines = kept_engines;
                if self.state.comparison_cases.is_empty() {
                    self.state.comparison_cases.push(ComparisonCase::empty());
                    self.engines.push(self.fresh_engine()?);
                }
                if self
                    .state
                    .saved_batch
                    .as_ref()
                    .is_some_and(|b| b.case_ids.iter().any(|id| ids.contains(id)))
                {
                    self.state.saved_batch = None;
                }
                Ok(vec![Effect::DeleteSavedCases { ids }])
            }
            Message::LoadBatchId { batch_id } => Ok(vec![Effect::LoadBatch { batch_id }]),
            Message::SetBatch { batch } => {
                let mut effects = Vec::new();
                for (index, saved_case_id) in batch.case_ids.iter().enumerate() {
                    self.grow_to(index)?;
                    self.state.comparison_cases[index].is_loading = true;
                    effects.push(Effect::LoadSavedCase {
                        index,
                        saved_case_id: *saved_case_id,
                    });
                }
                self.state.saved_batch = Some(batch);
                Ok(effects)
            }
            Message::SetInputValue {
                index,
                name,
                value,
                flags,
            } => {
                self.check_bounds(index)?;
                self.engines[index]
                    .set_value(&name, value, flags)
                    .map_err(StateError::Resolve)?;
                Ok(Vec::new())
            }
            Message::SetGroupOpenState { index, group, open } => {
                self.check_bounds(index)?;
                let case = &mut self.state.comparison_cases[index];
                case.data
                    .get_or_insert_with(CaseData::default)
                    .input_group_open_states
                    .insert(group, open);
                Ok(Vec::new())
            }
            Message::ToggleFocusedInput { index, name } => {
                self.check_bounds(index)?;
                focus::toggle_focused_input(&mut self.state, index, &name);
                Ok(Vec::new())
            }
            Message::SetFocusModeActive { index, active } => {
                self.check_bounds(index)?;
                focus::set_focus_mode(&mut self.state, index, active);
                Ok(Vec::new())
            }
            Message::SetFocusLinkActive {
                active,
                source_index,
            } => {
                self.check_bounds(source_index)?;
                focus::set_focus_link(&mut self.state, active, source_index);
                Ok(Vec::new())
            }
        }
    }

    /// Recomputes the cross-case derived flags:
    ///
    /// - chart controls are `Individual` iff the identities of all run cases
    ///   are equal (the same case duplicated into multiple slots);
    /// - the batch reference is dropped unless it covers every run case;
    /// - `is_unsaved` mirrors "has data but no persisted identity".
    fn recompute_derived(&mut self) {
        let run_identities: Vec<Uuid> = self
            .state
            .comparison_cases
            .iter()
            .filter(|c| c.has_result())
            .map(|c| c.identity())
            .collect();
        self.state.chart_control_allocation = if run_identities.iter().all_equal() {
            ChartControlAllocation::Individual
        } else {
            ChartControlAllocation::Group
        };

        if let Some(batch) = &self.state.saved_batch {
            if run_identities.iter().any(|id| !batch.case_ids.contains(id)) {
                debug!("active run cases are not all batch members; dropping batch reference");
                self.state.saved_batch = None;
            }
        }

        for case in &mut self.state.comparison_cases {
            case.is_unsaved = case.saved_case_id.is_none() && case.data.is_some();
        }
    }

    fn check_bounds(&self, index: usize) -> Result<(), StateError> {
        let len = self.state.comparison_cases.len();
        if index >= len {
            return Err(StateError::SlotOutOfBounds { index, len });
        }
        Ok(())
    }

    fn check_capacity(&self, wanted: usize) -> Result<(), StateError> {
        if wanted > self.config.max_comparison_cases {
            return Err(StateError::CapacityExceeded {
                max: self.config.max_comparison_cases,
            });
        }
        Ok(())
    }

    /// Grows the case list with empty slots so `index` is addressable.
    fn grow_to(&mut self, index: usize) -> Result<(), StateError> {
        while self.state.comparison_cases.len() <= index {
            self.state.comparison_cases.push(ComparisonCase::empty());
            self.engines.push(self.fresh_engine()?);
        }
        Ok(())
    }

    fn fresh_engine(&self) -> Result<InputEngine, StateError> {
        InputEngine::initialize(&self.schema, InitialValues::Fresh, self.context.clone())
            .map_err(StateError::Resolve)
    }

    fn engine_for_case(&self, case: &ComparisonCase) -> Result<InputEngine, StateError> {
        let initial = match &case.data {
            Some(data) => InitialValues::Loaded(&data.input_values),
            None => InitialValues::Fresh,
        };
        InputEngine::initialize(&self.schema, initial, self.context.clone())
            .map_err(StateError::Resolve)
    }
}
