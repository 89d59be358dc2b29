//! Solidity struct definitions for EIP-712 signing.

use alloy::sol;

sol! {
    /// EIP-2612 permit message.
    ///
    /// Type hash: `Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)`.
    #[derive(Debug, PartialEq, Eq)]
    struct Permit {
        address owner;
        address spender;
        uint256 value;
        uint256 nonce;
        uint256 deadline;
    }
}
