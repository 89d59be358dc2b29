use alloy::sol;

sol! {
    /// ERC-20 token with EIP-2612 `permit`.
    ///
    /// See more:
    ///
    /// <https://eips.ethereum.org/EIPS/eip-2612>
    #[sol(rpc)]
    contract ERC20Permit {
        function name() external view returns (string);
        function decimals() external view returns (uint8);
        function nonces(address owner) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function DOMAIN_SEPARATOR() external view returns (bytes32);

        function approve(address spender, uint256 value) external returns (bool);
        function transfer(address to, uint256 value) external returns (bool);
        function permit(
            address owner,
            address spender,
            uint256 value,
            uint256 deadline,
            uint8 v,
            bytes32 r,
            bytes32 s
        ) external;

        event Approval(address indexed owner, address indexed spender, uint256 value);
        event Transfer(address indexed from, address indexed to, uint256 value);
    }

    /// Staking and 1:1 swap contract.
    ///
    /// `tokenB` is staked and deposited as swap liquidity, `tokenA` is swapped into `tokenB`.
    #[sol(rpc)]
    contract SimpleStaking {
        function tokenA() external view returns (address);
        function tokenB() external view returns (address);
        function stakedBalance(address user) external view returns (uint256);
        function depositedBalance(address user) external view returns (uint256);
        function totalStaked() external view returns (uint256);
        function totalDeposited() external view returns (uint256);
        function getTokenBalance(address token) external view returns (uint256);

        function stake(uint256 amount) external;
        function deposit(uint256 amount) external;
        function withdraw(uint256 amount) external;
        function swap(uint256 amount) external;
        function stakeWithPermit(uint256 amount, uint256 deadline, uint8 v, bytes32 r, bytes32 s) external;
        function swapWithPermit(uint256 amount, uint256 deadline, uint8 v, bytes32 r, bytes32 s) external;
    }
}
