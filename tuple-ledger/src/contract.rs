//! Contract surface: one method per ledger invocation.
//!
//! Every mutating method runs against the invocation's [`Ledger`] and sets
//! exactly one `tuples-updated` event before returning, possibly empty. On
//! error nothing is flushed and the caller is expected to discard the
//! transaction.

use tracing::info;
use tuple_ledger_core::event::EventBatch;
use tuple_ledger_core::identity::{unique_key, TESTTUPLE_OBJECT, TRAINTUPLE_OBJECT};
use tuple_ledger_core::status::Status;
use tuple_ledger_core::traits::{Ledger, LedgerExt};
use tuple_ledger_core::tuple::{Testtuple, Traintuple};
use tuple_ledger_core::view::{ModelDetails, ModelView, TesttupleView, TraintupleView};
use tuple_ledger_core::Result;

use crate::cascade;
use crate::compute_plan;
use crate::config::ContractConfig;
use crate::input::{
    ComputePlanInput, ComputePlanOutput, KeyOutput, LogFailInput, LogSuccessTestInput,
    LogSuccessTrainInput, TesttupleInput, TraintupleInput,
};
use crate::query;
use crate::testtuple::{self, EvaluationRequest};
use crate::traintuple;
use crate::transition::{commit_status_update, StatusActor};

#[derive(Debug, Clone, Copy)]
pub struct Contract<'c> {
    config: &'c ContractConfig,
}

impl<'c> Contract<'c> {
    pub fn new(config: &'c ContractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContractConfig {
        self.config
    }

    pub fn create_traintuple<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        input: &TraintupleInput,
    ) -> Result<KeyOutput> {
        let mut tt = traintuple::set_from_input(&*ledger, self.config, input)?;
        traintuple::set_from_parents(&*ledger, &mut tt, &input.in_models)?;
        let key = unique_key(&*ledger, TRAINTUPLE_OBJECT, &tt.key_elements())?;
        traintuple::add_to_fl_task(&*ledger, &mut tt, input, &key)?;
        traintuple::save(ledger, &tt, &key)?;

        let mut batch = EventBatch::new();
        batch.push_traintuple(query::traintuple_view(&*ledger, &key, &tt)?);
        batch.flush(ledger)?;

        info!(key = %key, status = %tt.status, worker = %tt.dataset.worker, "traintuple created");
        Ok(KeyOutput { key })
    }

    pub fn create_testtuple<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        input: &TesttupleInput,
    ) -> Result<KeyOutput> {
        let mut te = testtuple::set_from_traintuple(&*ledger, &input.traintuple_key)?;
        testtuple::set_from_input(
            &*ledger,
            self.config,
            &mut te,
            EvaluationRequest {
                data_manager_key: &input.data_manager_key,
                data_sample_keys: &input.data_sample_keys,
                tag: &input.tag,
            },
        )?;
        let key = unique_key(&*ledger, TESTTUPLE_OBJECT, &te.key_elements())?;
        testtuple::save(ledger, &te, &key)?;

        let mut batch = EventBatch::new();
        batch.push_testtuple(query::testtuple_view(&*ledger, &key, &te)?);
        batch.flush(ledger)?;

        info!(key = %key, status = %te.status, certified = te.certified, "testtuple created");
        Ok(KeyOutput { key })
    }

    pub fn create_compute_plan<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        input: &ComputePlanInput,
    ) -> Result<ComputePlanOutput> {
        let (output, batch) = compute_plan::create_compute_plan(ledger, self.config, input)?;
        batch.flush(ledger)?;
        Ok(output)
    }

    pub fn log_start_train<L: Ledger + ?Sized>(&self, ledger: &mut L, key: &str) -> Result<TraintupleView> {
        let mut tt: Traintuple = ledger.get_asset(key)?;
        commit_status_update(ledger, key, &mut tt, Status::Doing, StatusActor::Worker)?;
        let view = query::traintuple_view(&*ledger, key, &tt)?;
        EventBatch::new().flush(ledger)?;
        Ok(view)
    }

    /// Record the out model, then release the traintuple's children.
    pub fn log_success_train<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        input: &LogSuccessTrainInput,
    ) -> Result<TraintupleView> {
        self.config.check_log(&input.log)?;
        let mut tt: Traintuple = ledger.get_asset(&input.key)?;
        tt.perf = input.perf;
        tt.out_model = Some(input.out_model.clone());
        tt.log.push_str(&input.log);
        commit_status_update(ledger, &input.key, &mut tt, Status::Done, StatusActor::Worker)?;

        let batch = cascade::propagate(ledger, &input.key, &tt)?;
        let view = query::traintuple_view(&*ledger, &input.key, &tt)?;
        batch.flush(ledger)?;
        Ok(view)
    }

    /// Fail the traintuple and every descendant still waiting on it.
    pub fn log_fail_train<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        input: &LogFailInput,
    ) -> Result<TraintupleView> {
        self.config.check_log(&input.log)?;
        let mut tt: Traintuple = ledger.get_asset(&input.key)?;
        tt.log.push_str(&input.log);
        tt.out_model = None;
        commit_status_update(ledger, &input.key, &mut tt, Status::Failed, StatusActor::Worker)?;

        let view = query::traintuple_view(&*ledger, &input.key, &tt)?;
        let batch = cascade::propagate(ledger, &input.key, &tt)?;
        batch.flush(ledger)?;
        Ok(view)
    }

    pub fn log_start_test<L: Ledger + ?Sized>(&self, ledger: &mut L, key: &str) -> Result<TesttupleView> {
        let mut te: Testtuple = ledger.get_asset(key)?;
        commit_status_update(ledger, key, &mut te, Status::Doing, StatusActor::Worker)?;
        let view = query::testtuple_view(&*ledger, key, &te)?;
        EventBatch::new().flush(ledger)?;
        Ok(view)
    }

    pub fn log_success_test<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        input: &LogSuccessTestInput,
    ) -> Result<TesttupleView> {
        self.config.check_log(&input.log)?;
        let mut te: Testtuple = ledger.get_asset(&input.key)?;
        te.dataset.perf = input.perf;
        te.log.push_str(&input.log);
        commit_status_update(ledger, &input.key, &mut te, Status::Done, StatusActor::Worker)?;
        let view = query::testtuple_view(&*ledger, &input.key, &te)?;
        EventBatch::new().flush(ledger)?;
        Ok(view)
    }

    pub fn log_fail_test<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        input: &LogFailInput,
    ) -> Result<TesttupleView> {
        self.config.check_log(&input.log)?;
        let mut te: Testtuple = ledger.get_asset(&input.key)?;
        te.log.push_str(&input.log);
        commit_status_update(ledger, &input.key, &mut te, Status::Failed, StatusActor::Worker)?;
        let view = query::testtuple_view(&*ledger, &input.key, &te)?;
        EventBatch::new().flush(ledger)?;
        Ok(view)
    }

    pub fn query_traintuple<L: Ledger + ?Sized>(&self, ledger: &L, key: &str) -> Result<TraintupleView> {
        query::query_traintuple(ledger, key)
    }

    pub fn query_traintuples<L: Ledger + ?Sized>(&self, ledger: &L) -> Result<Vec<TraintupleView>> {
        query::query_traintuples(ledger)
    }

    pub fn query_testtuple<L: Ledger + ?Sized>(&self, ledger: &L, key: &str) -> Result<TesttupleView> {
        query::query_testtuple(ledger, key)
    }

    pub fn query_testtuples<L: Ledger + ?Sized>(&self, ledger: &L) -> Result<Vec<TesttupleView>> {
        query::query_testtuples(ledger)
    }

    pub fn query_worker_traintuples<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        worker: &str,
        status: Status,
    ) -> Result<Vec<TraintupleView>> {
        query::query_worker_traintuples(ledger, worker, status)
    }

    pub fn query_worker_testtuples<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        worker: &str,
        status: Status,
    ) -> Result<Vec<TesttupleView>> {
        query::query_worker_testtuples(ledger, worker, status)
    }

    pub fn query_model_details<L: Ledger + ?Sized>(&self, ledger: &L, key: &str) -> Result<ModelDetails> {
        query::query_model_details(ledger, key)
    }

    pub fn query_models<L: Ledger + ?Sized>(&self, ledger: &L) -> Result<Vec<ModelView>> {
        query::query_models(ledger)
    }
}
