use serde::{Deserialize, Serialize};

/// Login principal roles. Every role except `Superadmin` is bound to
/// exactly one tenant; superadmins are unbound and act across tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "student" => Some(Role::Student),
            "teacher" => Some(Role::Teacher),
            "admin" => Some(Role::Admin),
            "superadmin" => Some(Role::Superadmin),
            _ => None,
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        use Permission::*;
        match self {
            Role::Student => matches!(
                permission,
                DashboardView | AttendanceView | ExamsView | FeesView
            ),
            Role::Teacher => matches!(
                permission,
                DashboardView | AttendanceManage | AttendanceView | ExamsManage | ExamsView
                    | FeesView
            ),
            Role::Admin => matches!(
                permission,
                DashboardView | AttendanceManage | AttendanceView | ExamsManage | ExamsView
                    | FeesManage | FeesView | UsersInvite | UsersManage | SettingsBranding
            ),
            // Superadmin holds everything, including tenant management
            Role::Superadmin => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    DashboardView,
    AttendanceManage,
    AttendanceView,
    ExamsManage,
    ExamsView,
    FeesManage,
    FeesView,
    UsersInvite,
    UsersManage,
    TenantsManage,
    SettingsBranding,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn students_are_read_only() {
        assert!(Role::Student.can(Permission::AttendanceView));
        assert!(!Role::Student.can(Permission::AttendanceManage));
        assert!(!Role::Student.can(Permission::UsersManage));
    }

    #[test]
    fn teachers_manage_attendance_and_exams_only() {
        assert!(Role::Teacher.can(Permission::AttendanceManage));
        assert!(Role::Teacher.can(Permission::ExamsManage));
        assert!(!Role::Teacher.can(Permission::FeesManage));
        assert!(!Role::Teacher.can(Permission::SettingsBranding));
    }

    #[test]
    fn only_superadmin_manages_tenants() {
        assert!(Role::Superadmin.can(Permission::TenantsManage));
        for role in [Role::Student, Role::Teacher, Role::Admin] {
            assert!(!role.can(Permission::TenantsManage));
        }
    }

    #[test]
    fn manage_implies_the_matching_view() {
        use Permission::*;
        let pairs = [
            (AttendanceManage, AttendanceView),
            (ExamsManage, ExamsView),
            (FeesManage, FeesView),
        ];
        for role in [Role::Student, Role::Teacher, Role::Admin, Role::Superadmin] {
            for (manage, view) in pairs {
                if role.can(manage) {
                    assert!(
                        role.can(view),
                        "{} can {:?} but not {:?}",
                        role.as_str(),
                        manage,
                        view
                    );
                }
            }
        }
    }

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::Student, Role::Teacher, Role::Admin, Role::Superadmin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("root"), None);
    }
}
