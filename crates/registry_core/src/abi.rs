//! Entry points of the child registry contract.

use alloy_sol_types::sol;
use shared::domain::ChildRecord;

sol! {
    interface IChildRegistry {
        struct Child {
            address account;
            string role;
        }

        function addChild(address account, string role) external;
        function removeChild(address account) external;
        function getChildren(address owner) external view returns (Child[] memory);
        function getChildByRole(address owner, string role) external view returns (address);
        function getChildCount(address owner) external view returns (uint256);
        function isChild(address owner, address candidate) external view returns (bool);
    }
}

impl From<IChildRegistry::Child> for ChildRecord {
    fn from(child: IChildRegistry::Child) -> Self {
        ChildRecord {
            account: child.account,
            role: child.role,
        }
    }
}

impl From<ChildRecord> for IChildRegistry::Child {
    fn from(record: ChildRecord) -> Self {
        IChildRegistry::Child {
            account: record.account,
            role: record.role,
        }
    }
}
