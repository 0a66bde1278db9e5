//! Solidity bindings for the calls the monitor depends on.

use alloy::sol;

sol! {
    #[sol(rpc)]
    interface ISequencer {
        function numNetworks() external view returns (uint256);
        function networkAt(uint256 index) external view returns (bytes32);
        function getMaster() external view returns (bytes32);
        function windows(bytes32 network) external view returns (uint256 start, uint256 length);
        function totalWindowSize() external view returns (uint256);
        function numJobs() external view returns (uint256);
        function jobAt(uint256 index) external view returns (address);
    }

    #[sol(rpc)]
    interface IJob {
        function workable(bytes32 network) external view returns (bool canWork, bytes memory args);
    }
}
