//! EIP-2612 permits.
//!
//! A permit is an off-chain, EIP-712 signed authorization letting `spender` move `value`
//! tokens out of `owner`'s balance. It replaces the separate `approve` transaction: the
//! spender contract redeems it with `permit(owner, spender, value, deadline, v, r, s)` as
//! part of its own call.
//!
//! The signature binds the exact `(owner, spender, value, nonce, deadline)` tuple under the
//! domain `{name, "1", chainId, token}`. The token's nonce for `owner` is read when the
//! permit is built, so two permits built before either is consumed share a nonce and only
//! the first one redeemed on-chain can succeed.

use alloy::{
    primitives::{Address, B256, ChainId, Signature, U256},
    sol_types::{Eip712Domain, SolStruct},
};
use chrono::Utc;

use crate::{
    Error, Result,
    evm::{Receipt, TokenApi},
};

mod signer;
pub mod solidity;

pub use signer::{TypedDataSigner, Wallet};

/// Lifetime of a permit when the caller doesn't pick a deadline.
pub const DEFAULT_PERMIT_TTL: u64 = 3600;

/// EIP-712 domain version used by permit tokens.
pub const PERMIT_VERSION: &str = "1";

/// The values a permit signs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermitRequest {
    /// Token being authorized. Also the EIP-712 verifying contract.
    pub token: Address,
    /// Account granting the allowance.
    pub owner: Address,
    /// Contract allowed to move the tokens.
    pub spender: Address,
    /// Amount in the token's smallest unit.
    pub value: U256,
    /// Owner's permit nonce at the time the request was built.
    pub nonce: U256,
    /// UNIX timestamp after which the permit is rejected.
    pub deadline: u64,
}

impl PermitRequest {
    /// The EIP-712 message for this request.
    pub fn message(&self) -> solidity::Permit {
        solidity::Permit {
            owner: self.owner,
            spender: self.spender,
            value: self.value,
            nonce: self.nonce,
            deadline: U256::from(self.deadline),
        }
    }

    /// Whether the permit is past its deadline at `now` (UNIX seconds).
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.deadline
    }
}

/// Domain a permit is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitDomain {
    /// Token name, as returned by `name()`.
    pub name: String,
    pub chain_id: ChainId,
    pub verifying_contract: Address,
}

impl PermitDomain {
    pub fn eip712(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(self.name.clone().into()),
            Some(PERMIT_VERSION.into()),
            Some(U256::from(self.chain_id)),
            Some(self.verifying_contract),
            None,
        )
    }
}

/// A signed permit, split into the `(v, r, s)` form contracts expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermitSignature {
    pub request: PermitRequest,
    pub domain: PermitDomain,
    /// Recovery id, 27 or 28.
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl PermitSignature {
    /// Splits `signature` into `(v, r, s)`.
    pub fn new(request: PermitRequest, domain: PermitDomain, signature: Signature) -> Self {
        Self {
            request,
            domain,
            v: 27 + u8::from(signature.v()),
            r: B256::from(signature.r().to_be_bytes::<32>()),
            s: B256::from(signature.s().to_be_bytes::<32>()),
        }
    }

    pub fn deadline(&self) -> U256 {
        U256::from(self.request.deadline)
    }

    /// Reassembles the ECDSA signature.
    pub fn signature(&self) -> Signature {
        Signature::new(
            U256::from_be_bytes(self.r.0),
            U256::from_be_bytes(self.s.0),
            self.v == 28,
        )
    }

    /// The EIP-712 digest that was signed.
    pub fn signing_hash(&self) -> B256 {
        self.request.message().eip712_signing_hash(&self.domain.eip712())
    }

    /// Recovers the address that produced the signature.
    pub fn recover_owner(&self) -> Result<Address> {
        self.signature()
            .recover_address_from_prehash(&self.signing_hash())
            .map_err(|err| Error::Signing(alloy::signers::Error::other(err)))
    }

    /// Whether the signature was produced by the request's owner.
    pub fn verify(&self) -> bool {
        self.recover_owner()
            .is_ok_and(|signer| signer == self.request.owner)
    }
}

/// Current UNIX time in seconds.
pub(crate) fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

/// Deadline `ttl` seconds from now.
pub fn deadline_after(ttl: u64) -> u64 {
    unix_now().saturating_add(ttl)
}

pub(crate) fn ensure_positive(amount: U256) -> Result<()> {
    if amount.is_zero() {
        return Err(Error::InvalidAmount("amount must be greater than zero".into()));
    }
    Ok(())
}

/// Builds and signs a permit letting `spender` move `amount` of `token` from the signer.
///
/// Reads the owner's nonce and the token name from the chain, takes the chain id from the
/// signer and asks the wallet to sign. `deadline` defaults to [`DEFAULT_PERMIT_TTL`]
/// seconds from now.
///
/// # Errors
///
/// - [`Error::SignerUnavailable`] if `signer` is `None`
/// - [`Error::InvalidAmount`] if `amount` is zero
/// - [`Error::ReadFailed`] if reading the nonce or name fails
/// - [`Error::UnsupportedSigner`] or [`Error::Signing`] if the wallet can't or won't sign
///
/// A stale nonce or a passed deadline is not detected here; the contract rejects the
/// permit when it is redeemed.
pub async fn build_permit<C, S>(
    chain: &C,
    signer: Option<&S>,
    token: Address,
    spender: Address,
    amount: U256,
    deadline: Option<u64>,
) -> Result<PermitSignature>
where
    C: TokenApi,
    S: TypedDataSigner,
{
    let signer = signer.ok_or(Error::SignerUnavailable)?;
    ensure_positive(amount)?;

    let owner = signer.address();
    let nonce = chain.nonces(token, owner).await?;
    let deadline = deadline.unwrap_or_else(|| deadline_after(DEFAULT_PERMIT_TTL));
    let name = chain.name(token).await?;

    let request = PermitRequest {
        token,
        owner,
        spender,
        value: amount,
        nonce,
        deadline,
    };
    let domain = PermitDomain {
        name,
        chain_id: signer.chain_id(),
        verifying_contract: token,
    };

    log::debug!(
        "signing permit for {owner}: spender={spender} value={amount} nonce={nonce} deadline={deadline}"
    );
    let signature = signer
        .sign_typed_data(&request.message(), &domain.eip712())
        .await?;

    Ok(PermitSignature::new(request, domain, signature))
}

/// Redeems a permit directly on the token, turning it into a plain allowance.
///
/// Any account can submit a permit; the transaction is sent from `from`, which need not be
/// the permit's owner.
pub async fn execute_permit<C: TokenApi>(
    chain: &C,
    from: Address,
    permit: &PermitSignature,
) -> Result<Receipt> {
    let receipt = chain.permit(from, permit).await?;
    log::info!(
        "permit of {} for {} redeemed on {} by {from}: {}",
        permit.request.owner,
        permit.request.spender,
        permit.request.token,
        receipt.tx_hash
    );
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use alloy::signers::local::PrivateKeySigner;

    use super::*;
    use crate::mock::{MockChain, OTHER_KEY, OWNER_KEY};

    fn wallet(key: &str) -> Wallet<PrivateKeySigner> {
        Wallet::new(key.parse::<PrivateKeySigner>().unwrap(), MockChain::CHAIN_ID)
    }

    #[tokio::test]
    async fn test_default_deadline_and_fields() {
        let chain = MockChain::new();
        let wallet = wallet(OWNER_KEY);

        let before = unix_now();
        let permit = build_permit(
            &chain,
            Some(&wallet),
            chain.token_b(),
            chain.staking(),
            U256::from(100),
            None,
        )
        .await
        .unwrap();
        let after = unix_now();

        assert_eq!(permit.request.value, U256::from(100));
        assert_eq!(permit.request.nonce, U256::ZERO);
        assert_eq!(permit.request.owner, wallet.address());
        assert_eq!(permit.request.spender, chain.staking());
        assert!(permit.request.deadline >= before + DEFAULT_PERMIT_TTL);
        assert!(permit.request.deadline <= after + DEFAULT_PERMIT_TTL);
        assert!(permit.v == 27 || permit.v == 28);
    }

    #[tokio::test]
    async fn test_signature_verifies_against_domain() {
        let chain = MockChain::new();
        let wallet = wallet(OWNER_KEY);

        let permit = build_permit(
            &chain,
            Some(&wallet),
            chain.token_b(),
            chain.staking(),
            U256::from(5),
            Some(1_900_000_000),
        )
        .await
        .unwrap();

        assert_eq!(permit.request.deadline, 1_900_000_000);
        assert_eq!(permit.domain.name, MockChain::TOKEN_B_NAME);
        assert_eq!(permit.domain.chain_id, MockChain::CHAIN_ID);
        assert_eq!(permit.domain.verifying_contract, chain.token_b());
        assert!(permit.verify());
        assert_eq!(permit.recover_owner().unwrap(), wallet.address());

        // any change to the signed tuple breaks the signature
        let mut tampered = permit.clone();
        tampered.request.value = U256::from(6);
        assert!(!tampered.verify());

        let mut tampered = permit.clone();
        tampered.request.spender = Address::ZERO;
        assert!(!tampered.verify());

        let mut tampered = permit;
        tampered.domain.chain_id = 1;
        assert!(!tampered.verify());
    }

    #[tokio::test]
    async fn test_permits_built_before_use_share_nonce() {
        let chain = MockChain::new();
        let wallet = wallet(OWNER_KEY);

        let first = build_permit(
            &chain,
            Some(&wallet),
            chain.token_b(),
            chain.staking(),
            U256::from(10),
            None,
        )
        .await
        .unwrap();
        let second = build_permit(
            &chain,
            Some(&wallet),
            chain.token_b(),
            chain.staking(),
            U256::from(10),
            None,
        )
        .await
        .unwrap();
        assert_eq!(first.request.nonce, second.request.nonce);
    }

    #[tokio::test]
    async fn test_missing_signer_and_zero_amount() {
        let chain = MockChain::new();

        let err = build_permit::<_, Wallet<PrivateKeySigner>>(
            &chain,
            None,
            chain.token_b(),
            chain.staking(),
            U256::from(1),
            None,
        )
        .await
        .unwrap_err();
        assert!(err.is_signer_unavailable());

        let wallet = wallet(OTHER_KEY);
        let err = build_permit(
            &chain,
            Some(&wallet),
            chain.token_b(),
            chain.staking(),
            U256::ZERO,
            None,
        )
        .await
        .unwrap_err();
        assert!(err.is_invalid_amount());
    }

    struct NoTypedData(Address);

    impl TypedDataSigner for NoTypedData {
        fn address(&self) -> Address {
            self.0
        }

        fn chain_id(&self) -> ChainId {
            MockChain::CHAIN_ID
        }

        async fn sign_typed_data<T>(&self, _: &T, _: &Eip712Domain) -> Result<Signature>
        where
            T: SolStruct + Send + Sync,
        {
            Err(Error::UnsupportedSigner)
        }
    }

    #[tokio::test]
    async fn test_unsupported_signer() {
        let chain = MockChain::new();
        let signer = NoTypedData(Address::repeat_byte(7));
        let err = build_permit(
            &chain,
            Some(&signer),
            chain.token_b(),
            chain.staking(),
            U256::from(1),
            None,
        )
        .await
        .unwrap_err();
        assert!(err.is_unsupported_signer());
    }

    #[tokio::test]
    async fn test_execute_permit_sets_allowance_and_bumps_nonce() {
        let chain = MockChain::new();
        let wallet = wallet(OWNER_KEY);

        let permit = build_permit(
            &chain,
            Some(&wallet),
            chain.token_b(),
            chain.staking(),
            U256::from(42),
            None,
        )
        .await
        .unwrap();
        let receipt = execute_permit(&chain, wallet.address(), &permit)
            .await
            .unwrap();
        assert!(receipt.success);

        let allowance = chain
            .allowance(chain.token_b(), wallet.address(), chain.staking())
            .await
            .unwrap();
        assert_eq!(allowance, U256::from(42));
        let nonce = chain
            .nonces(chain.token_b(), wallet.address())
            .await
            .unwrap();
        assert_eq!(nonce, U256::from(1));

        // replaying the same permit fails on the nonce
        let err = execute_permit(&chain, wallet.address(), &permit)
            .await
            .unwrap_err();
        assert_eq!(err.revert_reason(), Some("ERC20Permit: invalid signature"));
    }
}
