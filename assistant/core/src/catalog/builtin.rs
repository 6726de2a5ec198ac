//! Built-in OrgBot catalog data

use super::{Catalog, CatalogBuilder, EntrySpec, Response};

pub(super) const DEFAULT_TEXT: &str = "I'm sorry, I don't have information about that topic yet. Please try asking about GuardDuty, SSO, DNS, cost control, or account management.";

pub(super) const DEFAULT_CODE: &str = r#"# Example placeholder code
echo "No specific code available for this query"
# Please try one of the supported topics:
# - GuardDuty setup
# - SSO configuration
# - DNS management
# - Cost control
# - Account management"#;

const GUARDDUTY_TEXT: &str = "To enable AWS GuardDuty, you'll need to configure it in your AWS Management Console. Here's how to do it:";

const GUARDDUTY_CODE: &str = r#"# Enable GuardDuty
aws guardduty create-detector \
  --enable \
  --finding-publishing-frequency FIFTEEN_MINUTES \
  --data-sources S3Logs={Enable=true} \
  --region us-east-1"#;

const SSO_TEXT: &str = "Setting up AWS SSO involves configuring your identity provider and creating permission sets. Here's the basic setup:";

const SSO_CODE: &str = r#"# Create AWS SSO instance
aws sso-admin create-instance \
  --name "MySSOInstance" \
  --region us-east-1

# Create permission set
aws sso-admin create-permission-set \
  --instance-arn "arn:aws:sso:::instance/ssoins-xxxxxxxxxxxxx" \
  --name "AdministratorAccess" \
  --description "Provides full access to AWS services" \
  --session-duration "PT8H""#;

const DNS_TEXT: &str = "To configure DNS in AWS Route 53, you'll need to create a hosted zone and add records. Here's an example:";

const DNS_CODE: &str = r#"# Create hosted zone
aws route53 create-hosted-zone \
  --name "example.com" \
  --caller-reference "2024-03-20-01"

# Add A record
aws route53 change-resource-record-sets \
  --hosted-zone-id "ZXXXXXXXXXXXXX" \
  --change-batch '{
    "Changes": [{
      "Action": "CREATE",
      "ResourceRecordSet": {
        "Name": "example.com",
        "Type": "A",
        "TTL": 300,
        "ResourceRecords": [{"Value": "192.0.2.1"}]
      }
    }]
  }'"#;

const COST_TEXT: &str = "To implement cost controls in AWS, you can set up budgets and alerts. Here's how to create a monthly budget:";

const COST_CODE: &str = r#"# Create budget
aws budgets create-budget \
  --account-id 123456789012 \
  --budget '{
    "BudgetName": "MonthlyBudget",
    "BudgetLimit": {
      "Amount": "1000",
      "Unit": "USD"
    },
    "BudgetType": "COST",
    "TimeUnit": "MONTHLY"
  }'

# Create budget notification
aws budgets create-notification \
  --account-id 123456789012 \
  --budget-name "MonthlyBudget" \
  --notification '{
    "NotificationType": "ACTUAL",
    "ComparisonOperator": "GREATER_THAN",
    "Threshold": 80,
    "ThresholdType": "PERCENTAGE",
    "NotificationState": "ALARM"
  }'"#;

const ACCOUNTS_TEXT: &str = "To manage AWS accounts using AWS Organizations, you can create and organize accounts. Here's how:";

const ACCOUNTS_CODE: &str = r#"# Create organization
aws organizations create-organization \
  --feature-set ALL

# Create account
aws organizations create-account \
  --email "admin@example.com" \
  --account-name "Development" \
  --role-name "OrganizationAccountAccessRole" \
  --iam-user-access-to-billing DENY"#;

const PERMISSION_SETS_TEXT: &str = "To assign different permission sets to two teams of users across multiple AWS accounts, you can use Chatbot's PermissionSets. Here's how:

1. Define permission sets for each team
2. Assign the permission sets to the appropriate AWS accounts
3. Map users to their respective teams

Would you like to see how the code implementation works?";

const PERMISSION_SETS_CODE: &str = r#"// 🔧 Update targetGroups and managedPolicies with your team-specific values.

const teamA = new PermissionSets(this, 'TeamAPermissionSet', {
  instanceArn,
  permissionSetName: 'TeamAAccess',
  managedPolicies: ['arn:aws:iam::aws:policy/PowerUserAccess'],
  targetGroups: ['TeamA']
});

const teamB = new PermissionSets(this, 'TeamBPermissionSet', {
  instanceArn,
  permissionSetName: 'TeamBAccess',
  managedPolicies: ['arn:aws:iam::aws:policy/ViewOnlyAccess'],
  targetGroups: ['TeamB']
});"#;

const PERMISSION_SETS_VARIATIONS: [&str; 6] = [
    "how do i assign different permission sets to two teams of users across multiple aws account",
    "how do i assign different permission sets to two teams of users across multiple aws accounts",
    "how do i sign different permission sets to two teams of users across multiple aws account",
    "how do i sign different permission sets to two teams of users across multiple aws accounts",
    "how do i send different permission sets to two teams of users across multiple aws account",
    "how do i send different permission sets to two teams of users across multiple aws accounts",
];

const S3_PROMPT: &str = "Check for public S3 buckets";

const S3_TEXT: &str = "To check for public S3 buckets, you can use the AWS CLI or Python (boto3). Would you like to see a sample script?";

const S3_CODE: &str = r#"# Bash (AWS CLI)
aws s3api list-buckets --query "Buckets[].Name" --output text | xargs -I {} aws s3api get-bucket-acl --bucket {} --query "Grants[?Grantee.URI=='http://acs.amazonaws.com/groups/global/AllUsers']"

# Python (boto3)
import boto3

s3 = boto3.client('s3')
for bucket in s3.list_buckets()['Buckets']:
    acl = s3.get_bucket_acl(Bucket=bucket['Name'])
    for grant in acl['Grants']:
        if grant.get('Grantee', {}).get('URI') == 'http://acs.amazonaws.com/groups/global/AllUsers':
            print(f"Public bucket found: {bucket['Name']}")
"#;

const JIRA_PROMPT: &str = "Connect Jira to OrgBot";

const JIRA_TEXT: &str = "To connect Jira to OrgBot, generate an API token in your Atlassian account and add it to OrgBot's integrations. Would you like to see a sample integration script?";

const JIRA_CODE: &str = r#"# Python (requests)
import requests

JIRA_URL = "https://your-domain.atlassian.net"
API_TOKEN = "your_api_token"
EMAIL = "your_email"

headers = {
    "Authorization": f"Basic {EMAIL}:{API_TOKEN}",
    "Content-Type": "application/json"
}

response = requests.get(f"{JIRA_URL}/rest/api/3/project", headers=headers)
print(response.json())
"#;

const PRIVACY_PROMPT: &str = "Upload latest privacy policy";

const PRIVACY_TEXT: &str = "To upload your latest privacy policy, drag and drop the file or use the upload button. Would you like to see a sample upload handler?";

const PRIVACY_CODE: &str = r#"// JavaScript (Node.js/Express)
const express = require('express');
const multer = require('multer');
const upload = multer({ dest: 'uploads/' });

const app = express();
app.post('/upload', upload.single('policy'), (req, res) => {
  res.send('Privacy policy uploaded: ' + req.file.originalname);
});
"#;

const MFA_PROMPT: &str = "List users without MFA";

const MFA_TEXT: &str = "To list users without MFA, you can use the AWS CLI or Python (boto3). Would you like to see a sample script?";

const MFA_CODE: &str = r#"# Bash (AWS CLI)
aws iam list-users --query 'Users[*].UserName' --output text | xargs -I {} bash -c 'aws iam list-mfa-devices --user-name {} --query "MFADevices" --output text | grep -q . || echo {}'

# Python (boto3)
import boto3

iam = boto3.client('iam')
for user in iam.list_users()['Users']:
    mfa = iam.list_mfa_devices(UserName=user['UserName'])
    if not mfa['MFADevices']:
        print(f"User without MFA: {user['UserName']}")
"#;

const CHECKLIST_PROMPT: &str = "Generate a security checklist";

const CHECKLIST_TEXT: &str = "Here's a basic security checklist you can use to assess your cloud environment. Would you like to see a Python script that generates this checklist as a markdown file?";

const CHECKLIST_CODE: &str = r##"# security_checklist_generator.py

checklist = [
    "1. Ensure all S3 buckets are private",
    "2. Enable MFA for all users",
    "3. Rotate IAM credentials regularly",
    "4. Review security group rules",
    "5. Enable GuardDuty and CloudTrail",
    "6. Audit unused IAM roles and users",
    "7. Enforce strong password policies",
    "8. Check for public AMIs",
    "9. Enable logging for all resources",
    "10. Review third-party app permissions"
]

with open("security_checklist.md", "w") as f:
    f.write("# Security Checklist\n\n")
    for item in checklist:
        f.write(f"- {item}\n")

print("Security checklist generated: security_checklist.md")
"##;

/// Builder pre-loaded with the OrgBot data
pub(super) fn builder() -> CatalogBuilder {
    let scripted = [
        (S3_PROMPT, S3_TEXT, S3_CODE),
        (JIRA_PROMPT, JIRA_TEXT, JIRA_CODE),
        (PRIVACY_PROMPT, PRIVACY_TEXT, PRIVACY_CODE),
        (MFA_PROMPT, MFA_TEXT, MFA_CODE),
        (CHECKLIST_PROMPT, CHECKLIST_TEXT, CHECKLIST_CODE),
    ];

    let mut builder = Catalog::builder()
        .default_response(Response::bot(DEFAULT_TEXT, DEFAULT_CODE))
        .entry(EntrySpec::new("how do i enable guardduty", GUARDDUTY_TEXT, GUARDDUTY_CODE))
        .entry(EntrySpec::new("how do i set up sso", SSO_TEXT, SSO_CODE))
        .entry(EntrySpec::new("how do i configure dns", DNS_TEXT, DNS_CODE))
        .entry(EntrySpec::new("how do i add cost control", COST_TEXT, COST_CODE))
        .entry(EntrySpec::new("how do i manage accounts", ACCOUNTS_TEXT, ACCOUNTS_CODE))
        .entry(
            EntrySpec::new(
                PERMISSION_SETS_VARIATIONS[0],
                PERMISSION_SETS_TEXT,
                PERMISSION_SETS_CODE,
            )
            .with_key(PERMISSION_SETS_VARIATIONS[1])
            .with_variations(PERMISSION_SETS_VARIATIONS),
        );

    for (prompt, text, code) in scripted {
        builder = builder.entry(EntrySpec::new(prompt, text, code)).prompt(prompt);
    }

    builder
}

/// The compiled-in catalog
///
/// Validation is covered by the catalog tests; should it ever fail, the
/// error is logged and a catalog holding only the default response is used.
pub(super) fn catalog() -> Catalog {
    builder().build().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Built-in catalog failed validation");
        Catalog {
            version: super::CATALOG_VERSION,
            entries: Vec::new(),
            index: std::collections::HashMap::new(),
            default: Response::bot(DEFAULT_TEXT, DEFAULT_CODE),
            prompts: Vec::new(),
        }
    })
}
