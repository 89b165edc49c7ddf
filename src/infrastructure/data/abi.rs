// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use alloy::sol;

sol! {
    /// Reaper-style auto-compounding strategy.
    #[sol(rpc)]
    interface HarvestableStrategy {
        function estimateHarvest() external view returns (uint256 profit, uint256 callFeeToUser);
        function harvest() external;
    }

    /// WETH9-compatible wrapped native token.
    #[sol(rpc)]
    interface WrappedNative {
        function balanceOf(address owner) external view returns (uint256);
        function withdraw(uint256 wad) external;
    }
}
