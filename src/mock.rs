//! In-memory chain used by the unit tests.
//!
//! Implements the token and staking ABIs with the on-chain semantics the SDK relies on:
//! permits are checked by recovering the signer under the token's domain with the
//! owner's current nonce, expired permits are rejected, and a reverted call leaves the
//! ledger untouched.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use alloy::{
    primitives::{Address, B256, ChainId, Signature, U256, address, keccak256},
    signers::local::PrivateKeySigner,
    sol_types::{Eip712Domain, SolStruct},
};

use crate::{
    Error, Result,
    evm::{Operation, Receipt, StakingApi, TokenApi},
    permit::{self, PERMIT_VERSION, PermitSignature, solidity},
};

/// Funded with both tokens by [`MockChain::new`].
pub(crate) const OWNER_KEY: &str = "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e";
/// Unfunded account.
pub(crate) const OTHER_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

const TOKEN_A: Address = address!("0x00000000000000000000000000000000000000a1");
const TOKEN_B: Address = address!("0x00000000000000000000000000000000000000b2");
const STAKING: Address = address!("0x0000000000000000000000000000000000005a4e");

#[derive(Debug, Clone, Default)]
struct Ledger {
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    nonces: HashMap<(Address, Address), U256>,
    staked: HashMap<Address, U256>,
    deposited: HashMap<Address, U256>,
    total_staked: U256,
    total_deposited: U256,
}

type Revert = std::result::Result<(), String>;

impl Ledger {
    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.balances.get(&(token, owner)).copied().unwrap_or_default()
    }

    fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    fn nonce(&self, token: Address, owner: Address) -> U256 {
        self.nonces.get(&(token, owner)).copied().unwrap_or_default()
    }

    fn transfer(&mut self, token: Address, from: Address, to: Address, amount: U256) -> Revert {
        let balance = self.balance(token, from);
        if balance < amount {
            return Err("insufficient balance".into());
        }
        self.balances.insert((token, from), balance - amount);
        *self.balances.entry((token, to)).or_default() += amount;
        Ok(())
    }

    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Revert {
        let allowance = self.allowance(token, from, spender);
        if allowance < amount {
            return Err("insufficient allowance".into());
        }
        self.transfer(token, from, to, amount)?;
        self.allowances
            .insert((token, from, spender), allowance - amount);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn permit(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: U256,
        v: u8,
        r: B256,
        s: B256,
    ) -> Revert {
        if U256::from(permit::unix_now()) > deadline {
            return Err("ERC20Permit: expired deadline".into());
        }

        let nonce = self.nonce(token, owner);
        let message = solidity::Permit {
            owner,
            spender,
            value,
            nonce,
            deadline,
        };
        let domain = Eip712Domain::new(
            Some(MockChain::token_name(token)?.into()),
            Some(PERMIT_VERSION.into()),
            Some(U256::from(MockChain::CHAIN_ID)),
            Some(token),
            None,
        );
        let signature = Signature::new(
            U256::from_be_bytes(r.0),
            U256::from_be_bytes(s.0),
            v == 28,
        );
        let recovered = signature
            .recover_address_from_prehash(&message.eip712_signing_hash(&domain))
            .ok();
        if recovered != Some(owner) {
            return Err("ERC20Permit: invalid signature".into());
        }

        self.nonces.insert((token, owner), nonce + U256::from(1));
        self.allowances.insert((token, owner, spender), value);
        Ok(())
    }

    fn credit(map: &mut HashMap<Address, U256>, user: Address, amount: U256) {
        *map.entry(user).or_default() += amount;
    }
}

pub(crate) struct MockChain {
    ledger: Mutex<Ledger>,
    txs: AtomicUsize,
    reads: AtomicUsize,
    fail_next: Mutex<Option<(&'static str, String)>>,
    last_permit: Mutex<Option<(Address, PermitSignature)>>,
}

impl MockChain {
    pub const CHAIN_ID: ChainId = 31337;
    pub const TOKEN_A_NAME: &'static str = "USDC Test";
    pub const TOKEN_B_NAME: &'static str = "AMG Token";
    pub const INITIAL_BALANCE: u64 = 1_000_000;

    /// A chain where [`OWNER_KEY`] holds [`Self::INITIAL_BALANCE`] of both tokens.
    pub fn new() -> Self {
        let chain = Self {
            ledger: Mutex::default(),
            txs: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
            fail_next: Mutex::default(),
            last_permit: Mutex::default(),
        };
        let owner = Self::owner();
        chain.mint(TOKEN_A, owner, U256::from(Self::INITIAL_BALANCE));
        chain.mint(TOKEN_B, owner, U256::from(Self::INITIAL_BALANCE));
        chain
    }

    pub fn owner() -> Address {
        OWNER_KEY.parse::<PrivateKeySigner>().unwrap().address()
    }

    pub fn token_a(&self) -> Address {
        TOKEN_A
    }

    pub fn token_b(&self) -> Address {
        TOKEN_B
    }

    pub fn staking(&self) -> Address {
        STAKING
    }

    pub fn mint(&self, token: Address, to: Address, amount: U256) {
        let mut ledger = self.ledger.lock().unwrap();
        *ledger.balances.entry((token, to)).or_default() += amount;
    }

    /// Makes the next call to `method` revert with `reason`.
    pub fn fail_next(&self, method: &'static str, reason: &str) {
        *self.fail_next.lock().unwrap() = Some((method, reason.to_string()));
    }

    /// Sender and permit of the last permit-carrying transaction, successful or not.
    pub fn last_permit(&self) -> Option<(Address, PermitSignature)> {
        self.last_permit.lock().unwrap().clone()
    }

    fn record_permit(&self, from: Address, permit: &PermitSignature) {
        *self.last_permit.lock().unwrap() = Some((from, permit.clone()));
    }

    /// Number of read-only calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn token_name(token: Address) -> std::result::Result<&'static str, String> {
        match token {
            TOKEN_A => Ok(Self::TOKEN_A_NAME),
            TOKEN_B => Ok(Self::TOKEN_B_NAME),
            other => Err(format!("no token at {other}")),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Ledger) -> T) -> T {
        self.reads.fetch_add(1, Ordering::SeqCst);
        f(&self.ledger.lock().unwrap())
    }

    fn ensure_staking(contract: Address) -> Result<()> {
        if contract != STAKING {
            return Err(Error::read(format!("no contract at {contract}")));
        }
        Ok(())
    }

    /// Applies `f` to a copy of the ledger and commits it only if `f` succeeds.
    fn transact(&self, method: &'static str, f: impl FnOnce(&mut Ledger) -> Revert) -> Result<Receipt> {
        {
            let mut fail_next = self.fail_next.lock().unwrap();
            if fail_next.as_ref().is_some_and(|(name, _)| *name == method) {
                let (_, reason) = fail_next.take().unwrap();
                return Err(Error::reverted(reason));
            }
        }

        let mut ledger = self.ledger.lock().unwrap();
        let mut next = ledger.clone();
        f(&mut next).map_err(Error::reverted)?;
        *ledger = next;

        let tx = self.txs.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        Ok(Receipt {
            tx_hash: keccak256(tx.to_be_bytes()),
            success: true,
            block_number: Some(tx),
            gas_used: 21_000,
        })
    }
}

impl TokenApi for MockChain {
    async fn name(&self, token: Address) -> Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Self::token_name(token)
            .map(str::to_string)
            .map_err(Error::ReadFailed)
    }

    async fn decimals(&self, token: Address) -> Result<u8> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Self::token_name(token).map_err(Error::ReadFailed)?;
        Ok(18)
    }

    async fn nonces(&self, token: Address, owner: Address) -> Result<U256> {
        Ok(self.read(|ledger| ledger.nonce(token, owner)))
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256> {
        Ok(self.read(|ledger| ledger.balance(token, owner)))
    }

    async fn allowance(&self, token: Address, owner: Address, spender: Address) -> Result<U256> {
        Ok(self.read(|ledger| ledger.allowance(token, owner, spender)))
    }

    async fn approve(
        &self,
        token: Address,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<Receipt> {
        self.transact("approve", |ledger| {
            ledger.allowances.insert((token, from, spender), amount);
            Ok(())
        })
    }

    async fn transfer(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Receipt> {
        self.transact("transfer", |ledger| ledger.transfer(token, from, to, amount))
    }

    async fn permit(&self, from: Address, permit: &PermitSignature) -> Result<Receipt> {
        self.record_permit(from, permit);
        let request = permit.request;
        self.transact("permit", |ledger| {
            ledger.permit(
                request.token,
                request.owner,
                request.spender,
                request.value,
                permit.deadline(),
                permit.v,
                permit.r,
                permit.s,
            )
        })
    }
}

impl StakingApi for MockChain {
    async fn token_a(&self, contract: Address) -> Result<Address> {
        Self::ensure_staking(contract)?;
        Ok(self.read(|_| TOKEN_A))
    }

    async fn token_b(&self, contract: Address) -> Result<Address> {
        Self::ensure_staking(contract)?;
        Ok(self.read(|_| TOKEN_B))
    }

    async fn staked_balance(&self, contract: Address, user: Address) -> Result<U256> {
        Self::ensure_staking(contract)?;
        Ok(self.read(|ledger| ledger.staked.get(&user).copied().unwrap_or_default()))
    }

    async fn deposited_balance(&self, contract: Address, user: Address) -> Result<U256> {
        Self::ensure_staking(contract)?;
        Ok(self.read(|ledger| ledger.deposited.get(&user).copied().unwrap_or_default()))
    }

    async fn total_staked(&self, contract: Address) -> Result<U256> {
        Self::ensure_staking(contract)?;
        Ok(self.read(|ledger| ledger.total_staked))
    }

    async fn total_deposited(&self, contract: Address) -> Result<U256> {
        Self::ensure_staking(contract)?;
        Ok(self.read(|ledger| ledger.total_deposited))
    }

    async fn token_balance(&self, contract: Address, token: Address) -> Result<U256> {
        Self::ensure_staking(contract)?;
        Ok(self.read(|ledger| ledger.balance(token, contract)))
    }

    async fn stake(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt> {
        Self::ensure_staking(contract)?;
        self.transact("stake", |ledger| {
            ledger.transfer_from(TOKEN_B, contract, from, contract, amount)?;
            Ledger::credit(&mut ledger.staked, from, amount);
            ledger.total_staked += amount;
            Ok(())
        })
    }

    async fn deposit(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt> {
        Self::ensure_staking(contract)?;
        self.transact("deposit", |ledger| {
            ledger.transfer_from(TOKEN_B, contract, from, contract, amount)?;
            Ledger::credit(&mut ledger.deposited, from, amount);
            ledger.total_deposited += amount;
            Ok(())
        })
    }

    async fn withdraw(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt> {
        Self::ensure_staking(contract)?;
        self.transact("withdraw", |ledger| {
            let staked = ledger.staked.get(&from).copied().unwrap_or_default();
            if staked < amount {
                return Err("insufficient staked balance".into());
            }
            ledger.staked.insert(from, staked - amount);
            ledger.total_staked -= amount;
            ledger.transfer(TOKEN_B, contract, from, amount)
        })
    }

    async fn swap(&self, contract: Address, from: Address, amount: U256) -> Result<Receipt> {
        Self::ensure_staking(contract)?;
        self.transact("swap", |ledger| {
            ledger.transfer_from(TOKEN_A, contract, from, contract, amount)?;
            ledger
                .transfer(TOKEN_B, contract, from, amount)
                .map_err(|_| "insufficient liquidity".to_string())
        })
    }

    async fn with_permit(
        &self,
        operation: Operation,
        contract: Address,
        from: Address,
        amount: U256,
        permit: &PermitSignature,
    ) -> Result<Receipt> {
        Self::ensure_staking(contract)?;
        self.record_permit(from, permit);
        let (method, token) = match operation {
            Operation::Stake => ("stakeWithPermit", TOKEN_B),
            Operation::Swap => ("swapWithPermit", TOKEN_A),
        };
        self.transact(method, |ledger| {
            ledger.permit(
                token,
                from,
                contract,
                amount,
                permit.deadline(),
                permit.v,
                permit.r,
                permit.s,
            )?;
            ledger.transfer_from(token, contract, from, contract, amount)?;
            match operation {
                Operation::Stake => {
                    Ledger::credit(&mut ledger.staked, from, amount);
                    ledger.total_staked += amount;
                    Ok(())
                }
                Operation::Swap => ledger
                    .transfer(TOKEN_B, contract, from, amount)
                    .map_err(|_| "insufficient liquidity".to_string()),
            }
        })
    }
}
