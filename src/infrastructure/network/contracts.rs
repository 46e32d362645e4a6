// SPDX-License-Identifier: MIT

use alloy::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract UniV2Router {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
    }

    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract Erc20 {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }

    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract SwapBatcher {
        event OrderQueued(uint256 indexed orderId, address indexed user);

        function getQueueLength() external view returns (uint256);
        function getOrder(uint256 index) external view returns (address user, uint256 amountIn, uint256 minAmountOut, address[] memory path, uint256 deadline);
        function executeBatch() external;
    }
}
