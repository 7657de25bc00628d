//! Centralized Contract Definitions
//!
//! Solidity interfaces used by the bot, declared with alloy's `sol!` macro.
//! `#[sol(rpc)]` generates contract instance types callable through any
//! alloy `Provider`.

use alloy::sol;

// ── ERC20 ─────────────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }
}

// ── SushiSwap (Uniswap V2 router/factory ABI) ────────────────────────

sol! {
    #[sol(rpc)]
    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }
}

sol! {
    #[sol(rpc)]
    interface IUniswapV2Router02 {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
    }
}

// ── Uniswap V3 ───────────────────────────────────────────────────────

sol! {
    #[sol(rpc)]
    interface IQuoter {
        function quoteExactInputSingle(address tokenIn, address tokenOut, uint24 fee, uint256 amountIn, uint160 sqrtPriceLimitX96) external returns (uint256 amountOut);
    }
}

// ── Round-trip settlement contract ───────────────────────────────────
//
// Each execute* function performs both legs atomically and reverts unless
// the contract's configured minimum profit is met.

sol! {
    #[sol(rpc)]
    interface IArbitrageSettlement {
        function executeArbitrage(uint256 amountIn) external;
        function executeArbitrageReverse(uint256 amountIn) external;
        function executeArbitrageWithMagic(uint256 amountIn) external;
        function executeArbitrageWithMagicReverse(uint256 amountIn) external;
    }
}
