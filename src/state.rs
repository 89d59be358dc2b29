//! Application state threaded through [`Client::run`].
//!
//! Front ends keep one [`AccountState`] per connected account and hand it to every action.
//! The state carries what a UI needs to render: the last balances read, the last receipt,
//! the last error and whether an action is running.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    evm::{Operation, Receipt, StakingApi, TokenApi},
    permit::TypedDataSigner,
    staking::{BalanceSnapshot, Client},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountState {
    pub balances: Option<BalanceSnapshot>,
    pub last_receipt: Option<Receipt>,
    pub last_error: Option<String>,
    pub busy: bool,
}

impl AccountState {
    /// Marks the state busy and clears the previous outcome.
    ///
    /// Fails if an action is already running on this state.
    pub fn begin(&mut self) -> Result<()> {
        if self.busy {
            return Err(Error::Busy);
        }
        self.busy = true;
        self.last_error = None;
        self.last_receipt = None;
        Ok(())
    }

    /// Records the outcome of an action and clears `busy`.
    pub fn finish(&mut self, outcome: &Result<Receipt>) {
        self.busy = false;
        match outcome {
            Ok(receipt) => self.last_receipt = Some(*receipt),
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }
}

/// A state-changing action, with its amount in smallest units.
///
/// Permit actions sign for the token the contract pulls: `tokenB` for staking and
/// depositing, `tokenA` for swapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Action {
    #[display("stake {_0} with permit")]
    StakeWithPermit(U256),
    #[display("swap {_0} with permit")]
    SwapWithPermit(U256),
    #[display("deposit {_0} with approve")]
    DepositWithApprove(U256),
    #[display("stake {_0}")]
    Stake(U256),
    #[display("deposit {_0}")]
    Deposit(U256),
    #[display("withdraw {_0}")]
    Withdraw(U256),
    #[display("swap {_0}")]
    Swap(U256),
}

impl<C, S> Client<C, S>
where
    C: TokenApi + StakingApi,
    S: TypedDataSigner,
{
    /// Re-reads balances for the connected account, or aggregates only without a wallet.
    pub async fn refresh(&self, mut state: AccountState) -> AccountState {
        let owner = self.signer().map(|signer| signer.address());
        match self.balances(owner).await {
            Ok(balances) => state.balances = Some(balances),
            Err(err) => {
                log::warn!("refreshing balances failed: {err}");
                state.last_error = Some(err.to_string());
            }
        }
        state
    }

    /// Runs `action`, records its receipt or error in `state`, then re-reads balances.
    pub async fn run(&self, mut state: AccountState, action: Action) -> AccountState {
        if let Err(err) = state.begin() {
            log::warn!("{action} rejected: {err}");
            state.last_error = Some(err.to_string());
            return state;
        }

        log::debug!("running {action}");
        let outcome = self.dispatch(action).await;
        state.finish(&outcome);

        let error = state.last_error.take();
        let mut state = self.refresh(state).await;
        // the action's error wins over a refresh error
        if error.is_some() {
            state.last_error = error;
        }
        state
    }

    async fn dispatch(&self, action: Action) -> Result<Receipt> {
        match action {
            Action::StakeWithPermit(amount) => {
                let token = self.tokens().await?.token_b;
                self.execute(Operation::Stake, token, amount).await
            }
            Action::SwapWithPermit(amount) => {
                let token = self.tokens().await?.token_a;
                self.execute(Operation::Swap, token, amount).await
            }
            Action::DepositWithApprove(amount) => {
                let token = self.tokens().await?.token_b;
                self.deposit_with_approve(token, amount).await
            }
            Action::Stake(amount) => self.stake(amount).await,
            Action::Deposit(amount) => self.deposit(amount).await,
            Action::Withdraw(amount) => self.withdraw(amount).await,
            Action::Swap(amount) => self.swap(amount).await,
        }
    }
}
