//! Bindings for the WavePortal contract.

use alloy_json_abi::JsonAbi;
use alloy_sol_types::sol;
use serde::Deserialize;

sol! {
    /// The deployed WavePortal contract.
    interface IWavePortal {
        /// A wave as stored by the contract.
        #[derive(Debug, PartialEq, Eq)]
        struct Wave {
            address waver;
            string message;
            uint256 timestamp;
        }

        /// Emitted for every accepted wave.
        #[derive(Debug, PartialEq, Eq)]
        event NewWave(address indexed from, uint256 timestamp, string message);

        function wave(string memory _message) external;

        function getAllWaves() external view returns (Wave[] memory);

        function getTotalWaves() external view returns (uint256);
    }
}

/// The compiled WavePortal artifact this crate was built against.
pub const WAVE_PORTAL_ARTIFACT: &str = include_str!("../abi/WavePortal.json");

#[derive(Deserialize)]
struct Artifact {
    abi: JsonAbi,
}

/// Parses the ABI out of [`WAVE_PORTAL_ARTIFACT`].
pub fn wave_portal_abi() -> serde_json::Result<JsonAbi> {
    serde_json::from_str::<Artifact>(WAVE_PORTAL_ARTIFACT).map(|artifact| artifact.abi)
}
