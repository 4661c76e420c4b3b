use alloy::{primitives::Address, sol};
use blockchain::ContractBinding;

pub const REPORT_MISSED_SLEEP: &str = "reportMissedSleep";
pub const NOMINATE: &str = "nominate";
pub const MARKETPLACE_REQUEST: &str = "request";

/// Number of validators a nomination names.
pub const NOMINATION_SIZE: usize = 5;

sol! {
    #[sol(abi)]
    contract SleepFine {
        event ChallengeStarted(uint256 indexed challengeId, address indexed user, uint64 numDays);
        event SleepMissed(uint256 indexed challengeId, uint256 dayId);

        function getCurrentDate() external view returns (uint64);
        function startChallenge(uint64 numDays, address app) external payable returns (uint256);
        function reportMissedSleep(uint256 challengeId, uint256 dayId) external;
    }
}

sol! {
    #[sol(abi)]
    contract ValidatorStaking {
        event Nominated(address indexed nominator, address[5] targets);

        function nominate(address[5] calldata targets) external;
    }
}

sol! {
    #[sol(abi)]
    contract MechMarketplace {
        event MarketplaceRequest(
            address indexed requester,
            address indexed priorityMech,
            uint256 requestId,
            bytes requestData
        );

        function request(
            bytes calldata requestData,
            address priorityMech,
            uint256 responseTimeout
        ) external payable returns (uint256 requestId);
    }
}

pub fn sleep_fine(address: Address) -> ContractBinding {
    ContractBinding::new(address, SleepFine::abi::contract())
}

pub fn validator_staking(address: Address) -> ContractBinding {
    ContractBinding::new(address, ValidatorStaking::abi::contract())
}

pub fn mech_marketplace(address: Address) -> ContractBinding {
    ContractBinding::new(address, MechMarketplace::abi::contract())
}
