use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::Ethereum,
    primitives::{Address, U256},
    sol_types::{ContractError, GenericRevertReason, RevertReason},
};

use super::{
    Operation, Provider, Receipt, StakingApi, TokenApi,
    contracts::{ERC20Permit, SimpleStaking},
};
use crate::{Error, Result, permit::PermitSignature};

/// [`TokenApi`] and [`StakingApi`] over an alloy provider.
///
/// Transactions are sent with `from` set, so the provider needs a wallet filler holding
/// the key for that account (see [`connect_with_signer`](super::connect_with_signer)).
/// Transaction nonces and gas are left to the provider's fillers.
#[derive(Debug, Clone)]
pub struct AlloyBackend<P> {
    provider: P,
}

impl<P: Provider> AlloyBackend<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn token(&self, address: Address) -> ERC20Permit::ERC20PermitInstance<&P> {
        ERC20Permit::new(address, &self.provider)
    }

    fn staking(&self, address: Address) -> SimpleStaking::SimpleStakingInstance<&P> {
        SimpleStaking::new(address, &self.provider)
    }
}

/// Sends `call` from `from` and waits for one confirmation.
async fn submit<Q, D>(
    call: CallBuilder<Q, D, Ethereum>,
    from: Address,
    label: &str,
) -> Result<Receipt>
where
    Q: Provider,
    D: CallDecoder,
{
    let pending = call.from(from).send().await.map_err(classify)?;
    let tx_hash = *pending.tx_hash();
    log::info!("{label}: submitted {tx_hash} from {from}");

    let receipt = pending
        .get_receipt()
        .await
        .map_err(|err| Error::Transport(format!("waiting for {tx_hash}: {err}")))?;
    confirmed(Receipt::from(&receipt), label)
}

/// Turns a mined receipt with a failed status into a revert.
fn confirmed(receipt: Receipt, label: &str) -> Result<Receipt> {
    let tx_hash = receipt.tx_hash;
    if !receipt.success {
        log::warn!("{label}: {tx_hash} reverted");
        return Err(Error::TransactionReverted {
            reason: None,
            tx_hash: Some(tx_hash),
        });
    }

    log::info!("{label}: confirmed {tx_hash} in block {:?}", receipt.block_number);
    Ok(receipt)
}

/// Decodes ABI-encoded revert data.
///
/// `Error(string)` yields the bare string, the same text a node puts after
/// `execution reverted: `. Panics and custom errors keep their display form.
fn revert_reason(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    let reason = match GenericRevertReason::decode(data)? {
        RevertReason::ContractError(ContractError::Revert(revert)) => revert.reason,
        RevertReason::RawString(reason) => reason,
        other => other.to_string(),
    };
    (!reason.is_empty()).then_some(reason)
}

/// Maps a submission error to a revert when the node reported one.
///
/// Reverts surface at gas estimation, before anything is broadcast, either as ABI-encoded
/// revert data or as an `execution reverted: <reason>` RPC error.
fn classify(err: alloy::contract::Error) -> Error {
    let data = err.as_revert_data();
    let mut reason = data.as_ref().and_then(|data| revert_reason(data));
    let mut reverted = data.is_some();

    if reason.is_none() {
        if let alloy::contract::Error::TransportError(rpc) = &err {
            if let Some(message) = rpc
                .as_error_resp()
                .and_then(|payload| payload.message.strip_prefix("execution reverted"))
            {
                let message = message.trim_start_matches(':').trim();
                reason = (!message.is_empty()).then(|| message.to_string());
                reverted = true;
            }
        }
    }

    if reverted {
        log::warn!("reverted: {}", reason.as_deref().unwrap_or("no reason given"));
        return Error::TransactionReverted {
            reason,
            tx_hash: None,
        };
    }

    Error::Transport(err.to_string())
}

impl<P: Provider> TokenApi for AlloyBackend<P> {
    async fn name(&self, token: Address) -> Result<String> {
        self.token(token).name().call().await.map_err(Error::read)
    }

    async fn decimals(&self, token: Address) -> Result<u8> {
        self.token(token).decimals().call().await.map_err(Error::read)
    }

    async fn nonces(&self, token: Address, owner: Address) -> Result<U256> {
        self.token(token)
            .nonces(owner)
            .call()
            .await
            .map_err(Error::read)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        self.token(token)
            .balanceOf(owner)
            .call()
            .await
            .map_err(Error::read)
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        self.token(token)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(Error::read)
    }

    async fn approve(
        &self,
        token: Address,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<Receipt> {
        let token = self.token(token);
        let call = token.approve(spender, amount);
        submit(call, from, "approve").await
    }

    async fn transfer(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Receipt> {
        let token = self.token(token);
        let call = token.transfer(to, amount);
        submit(call, from, "transfer").await
    }

    async fn permit(&self, from: Address, permit: &PermitSignature) -> Result<Receipt> {
        let request = &permit.request;
        let token = self.token(request.token);
        let call = token.permit(
            request.owner,
            request.spender,
            request.value,
            permit.deadline(),
            permit.v,
            permit.r,
            permit.s,
        );
        submit(call, from, "permit").await
    }
}

impl<P: Provider> StakingApi for AlloyBackend<P> {
    async fn token_a(&self, contract: Address) -> Result<Address> {
        self.staking(contract)
            .tokenA()
            .call()
            .await
            .map_err(Error::read)
    }

    async fn token_b(&self, contract: Address) -> Result<Address> {
        self.staking(contract)
            .tokenB()
            .call()
            .await
            .map_err(Error::read)
    }

    async fn staked_balance(&self, contract: Address, user: Address) -> Result<U256> {
        self.staking(contract)
            .stakedBalance(user)
            .call()
            .await
            .map_err(Error::read)
    }

    async fn deposited_balance(&self, contract: Address, user: Address) -> Result<U256> {
        self.staking(contract)
            .depositedBalance(user)
            .call()
            .await
            .map_err(Error::read)
    }

    async fn total_staked(&self, contract: Address) -> Result<U256> {
        self.staking(contract)
            .totalStaked()
            .call()
            .await
            .map_err(Error::read)
    }

    async fn total_deposited(&self, contract: Address) -> Result<U256> {
        self.staking(contract)
            .totalDeposited()
            .call()
            .await
            .map_err(Error::read)
    }

    async fn token_balance(&self, contract: Address, token: Address) -> Result<U256> {
        self.staking(contract)
            .getTokenBalance(token)
            .call()
            .await
            .map_err(Error::read)
    }

    async fn stake(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt> {
        let staking = self.staking(contract);
        let call = staking.stake(amount);
        submit(call, from, "stake").await
    }

    async fn deposit(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt> {
        let staking = self.staking(contract);
        let call = staking.deposit(amount);
        submit(call, from, "deposit").await
    }

    async fn withdraw(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt> {
        let staking = self.staking(contract);
        let call = staking.withdraw(amount);
        submit(call, from, "withdraw").await
    }

    async fn swap(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt> {
        let staking = self.staking(contract);
        let call = staking.swap(amount);
        submit(call, from, "swap").await
    }

    async fn with_permit(
        &self,
        operation: Operation,
        contract: Address,
        from: Address,
        amount: U256,
        permit: &PermitSignature,
    ) -> Result<Receipt> {
        let staking = self.staking(contract);
        match operation {
            Operation::Stake => {
                let call =
                    staking.stakeWithPermit(amount, permit.deadline(), permit.v, permit.r, permit.s);
                submit(call, from, "stakeWithPermit").await
            }
            Operation::Swap => {
                let call =
                    staking.swapWithPermit(amount, permit.deadline(), permit.v, permit.r, permit.s);
                submit(call, from, "swapWithPermit").await
            }
        }
    }
}
