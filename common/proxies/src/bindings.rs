use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ILendingPoolAddressesProvider {
        function getLendingPool() external view returns (address);
    }

    #[sol(rpc)]
    interface ILendingPool {
        function deposit(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;

        function borrow(
            address asset,
            uint256 amount,
            uint256 interestRateMode,
            uint16 referralCode,
            address onBehalfOf
        ) external;

        function repay(address asset, uint256 amount, uint256 rateMode, address onBehalfOf)
            external
            returns (uint256);

        function getUserAccountData(address user)
            external
            view
            returns (
                uint256 totalCollateralETH,
                uint256 totalDebtETH,
                uint256 availableBorrowsETH,
                uint256 currentLiquidationThreshold,
                uint256 ltv,
                uint256 healthFactor
            );
    }

    #[sol(rpc)]
    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface IWETH {
        function deposit() external payable;

        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface AggregatorV3Interface {
        function decimals() external view returns (uint8);

        function latestRoundData()
            external
            view
            returns (
                uint80 roundId,
                int256 answer,
                uint256 startedAt,
                uint256 updatedAt,
                uint80 answeredInRound
            );
    }
}
